use std::mem;

/// A filter expression syntax tree.
///
/// Children are owned exclusively by their parent. Trees are built once by
/// the parser and never mutated afterwards.
///
/// Flat chains such as `a | b | c` nest once per operator, so comparison,
/// printing and dropping walk the tree with a heap stack instead of
/// recursing.
#[derive(Clone, Eq, Debug)]
pub enum AstNode {
    /// A tag key or value.
    Literal(String),
    /// A regular expression, with escapes kept as written.
    Regex(String),

    // Logical
    Not(Box<AstNode>),
    And(Box<AstNode>, Box<AstNode>),
    Or(Box<AstNode>, Box<AstNode>),
    Xor(Box<AstNode>, Box<AstNode>),

    // Equality class, never nested in one another
    Equals(Box<AstNode>, Box<AstNode>),
    NotEquals(Box<AstNode>, Box<AstNode>),
}

impl AstNode {
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        AstNode::Literal(text.into())
    }

    #[must_use]
    pub fn regex(pattern: impl Into<String>) -> Self {
        AstNode::Regex(pattern.into())
    }

    #[must_use]
    pub fn not(operand: AstNode) -> Self {
        AstNode::Not(Box::new(operand))
    }

    #[must_use]
    pub fn and(left: AstNode, right: AstNode) -> Self {
        AstNode::And(Box::new(left), Box::new(right))
    }

    #[must_use]
    pub fn or(left: AstNode, right: AstNode) -> Self {
        AstNode::Or(Box::new(left), Box::new(right))
    }

    #[must_use]
    pub fn xor(left: AstNode, right: AstNode) -> Self {
        AstNode::Xor(Box::new(left), Box::new(right))
    }

    #[must_use]
    pub fn equals(left: AstNode, right: AstNode) -> Self {
        AstNode::Equals(Box::new(left), Box::new(right))
    }

    #[must_use]
    pub fn not_equals(left: AstNode, right: AstNode) -> Self {
        AstNode::NotEquals(Box::new(left), Box::new(right))
    }

    /// The left operand of a binary node.
    #[must_use]
    pub fn left(&self) -> Option<&AstNode> {
        match self {
            AstNode::And(left, _)
            | AstNode::Or(left, _)
            | AstNode::Xor(left, _)
            | AstNode::Equals(left, _)
            | AstNode::NotEquals(left, _) => Some(&**left),
            AstNode::Literal(_) | AstNode::Regex(_) | AstNode::Not(_) => None,
        }
    }

    /// The right operand of a binary node.
    #[must_use]
    pub fn right(&self) -> Option<&AstNode> {
        match self {
            AstNode::And(_, right)
            | AstNode::Or(_, right)
            | AstNode::Xor(_, right)
            | AstNode::Equals(_, right)
            | AstNode::NotEquals(_, right) => Some(&**right),
            AstNode::Literal(_) | AstNode::Regex(_) | AstNode::Not(_) => None,
        }
    }

    /// The operand of a unary node.
    #[must_use]
    pub fn center(&self) -> Option<&AstNode> {
        match self {
            AstNode::Not(operand) => Some(&**operand),
            AstNode::Literal(_)
            | AstNode::Regex(_)
            | AstNode::And(..)
            | AstNode::Or(..)
            | AstNode::Xor(..)
            | AstNode::Equals(..)
            | AstNode::NotEquals(..) => None,
        }
    }

    /// Iterates over the occupied child slots in `left`, `right`, `center`
    /// order.
    pub fn children(&self) -> impl DoubleEndedIterator<Item = &AstNode> {
        [self.left(), self.right(), self.center()].into_iter().flatten()
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, AstNode::Literal(_) | AstNode::Regex(_))
    }

    /// Returns whether this node is `=` or `!=`.
    #[must_use]
    pub fn is_equality(&self) -> bool {
        matches!(self, AstNode::Equals(..) | AstNode::NotEquals(..))
    }

    /// Returns the first equality-class node strictly below this one, in
    /// depth-first order.
    #[must_use]
    pub fn find_nested_equality(&self) -> Option<&AstNode> {
        let mut pending: Vec<_> = self.children().rev().collect();
        while let Some(node) = pending.pop() {
            if node.is_equality() {
                return Some(node);
            }
            pending.extend(node.children().rev());
        }
        None
    }

    /// The operator symbol of a non-leaf node.
    #[must_use]
    pub fn operator(&self) -> Option<&'static str> {
        match self {
            AstNode::Literal(_) | AstNode::Regex(_) => None,
            AstNode::Not(_) => Some("!"),
            AstNode::And(..) => Some("&"),
            AstNode::Or(..) => Some("|"),
            AstNode::Xor(..) => Some("^"),
            AstNode::Equals(..) => Some("="),
            AstNode::NotEquals(..) => Some("!="),
        }
    }

    /// Counts the nodes in the tree.
    #[must_use]
    pub fn size(&self) -> usize {
        let mut pending = vec![self];
        let mut size = 0;
        while let Some(node) = pending.pop() {
            size += 1;
            pending.extend(node.children());
        }
        size
    }

    /// Moves the compound children out of this node, leaving empty literals
    /// in their slots.
    fn take_children(&mut self, out: &mut Vec<AstNode>) {
        let mut take = |slot: &mut Box<AstNode>| {
            if !slot.is_leaf() {
                out.push(mem::replace(&mut **slot, AstNode::Literal(String::new())));
            }
        };
        match self {
            AstNode::Literal(_) | AstNode::Regex(_) => {}
            AstNode::Not(operand) => take(operand),
            AstNode::And(left, right)
            | AstNode::Or(left, right)
            | AstNode::Xor(left, right)
            | AstNode::Equals(left, right)
            | AstNode::NotEquals(left, right) => {
                take(left);
                take(right);
            }
        }
    }
}

impl PartialEq for AstNode {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            let same = match (a, b) {
                (AstNode::Literal(x), AstNode::Literal(y))
                | (AstNode::Regex(x), AstNode::Regex(y)) => x == y,
                _ => mem::discriminant(a) == mem::discriminant(b),
            };
            if !same {
                return false;
            }
            pending.extend(a.children().zip(b.children()));
        }
        true
    }
}

impl Drop for AstNode {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.take_children(&mut pending);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(len: usize) -> AstNode {
        let pair = || AstNode::equals(AstNode::literal("k"), AstNode::literal("v"));
        (1..len).fold(AstNode::literal("a"), |left, _| AstNode::or(left, pair()))
    }

    #[test]
    fn walks_deep_trees_without_recursing() {
        let tree = chain(200_000);
        assert_eq!(tree.size(), 1 + 4 * 199_999);
        let nested = tree.find_nested_equality();
        assert_eq!(nested.and_then(AstNode::operator), Some("="));
        assert_eq!(tree, chain(200_000));
        assert_ne!(tree, chain(199_999));
    }

    #[test]
    fn equality_compares_leaf_text() {
        assert_eq!(AstNode::literal("a"), AstNode::literal("a"));
        assert_ne!(AstNode::literal("a"), AstNode::regex("a"));
        assert_ne!(
            AstNode::and(AstNode::literal("a"), AstNode::literal("b")),
            AstNode::or(AstNode::literal("a"), AstNode::literal("b"))
        );
    }
}
