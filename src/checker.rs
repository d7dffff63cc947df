//! Semantic validation of parsed filter expressions.

use super::{
    ast::AstNode,
    diagnostic::{Diagnostic, Stage},
};

/// The error type returned by [`check`].
///
/// Raised when an equality-class operator (`=` or `!=`) has another one
/// anywhere in its operand subtrees, as in `a = b = c` or `k = (v != w)`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unexpected `{inner}` nested inside `{outer}` in `{expression}`")]
pub struct SemanticError {
    /// The operator of the enclosing comparison.
    pub outer: &'static str,
    /// The operator of the nested comparison.
    pub inner: &'static str,
    /// The enclosing comparison, rendered back to expression text.
    pub expression: String,
    /// Index of the nested operator among all `=` and `!=` operators of the
    /// checked tree, in source order.
    pub ordinal: usize,
    /// Byte offset of the nested operator, once located.
    pub pos: Option<usize>,
    /// The input line, once located.
    pub line: Option<String>,
}

impl SemanticError {
    /// Attaches the source position of the nested operator, given the
    /// comparison offsets recorded by
    /// [`Parser::parse_with_comparisons`](crate::Parser::parse_with_comparisons).
    #[must_use]
    pub fn locate(mut self, comparisons: &[usize], line: Option<&str>) -> Self {
        self.pos = comparisons.get(self.ordinal).copied();
        self.line = line.map(str::to_owned);
        self
    }

    /// Without a prior [`SemanticError::locate`], the diagnostic has no
    /// caret line.
    #[must_use]
    pub fn diagnostic(&self) -> Diagnostic<'_> {
        Diagnostic {
            stage: Stage::Semantic,
            message: self.to_string(),
            line: self.line.as_deref(),
            offset: self.pos,
        }
    }
}

pub type Result<T> = std::result::Result<T, SemanticError>;

/// Checks that no comparison is nested inside another comparison.
///
/// The whole tree is walked depth-first; the first violation found is
/// returned.
///
/// # Errors
///
/// If an `=` or `!=` node contains another `=` or `!=` node, a
/// [`SemanticError`] is returned.
pub fn check(ast: &AstNode) -> Result<()> {
    let mut pending = vec![ast];
    while let Some(node) = pending.pop() {
        if node.is_equality()
            && let Some(nested) = node.find_nested_equality()
        {
            return Err(SemanticError {
                outer: node.operator().unwrap_or_default(),
                inner: nested.operator().unwrap_or_default(),
                expression: node.to_string(),
                ordinal: source_ordinal(ast, nested),
                pos: None,
                line: None,
            });
        }
        pending.extend(node.children().rev());
    }
    Ok(())
}

/// Counts the comparisons that precede `target` in an in-order walk of
/// `root`, which visits operators in the order they were written.
fn source_ordinal(root: &AstNode, target: &AstNode) -> usize {
    let mut ordinal = 0;
    let mut pending = Vec::new();
    let mut current = Some(root);
    loop {
        while let Some(node) = current {
            pending.push(node);
            current = node.left();
        }
        let Some(node) = pending.pop() else {
            return ordinal;
        };
        if std::ptr::eq(node, target) {
            return ordinal;
        }
        if node.is_equality() {
            ordinal += 1;
        }
        current = node.right().or_else(|| node.center());
    }
}
