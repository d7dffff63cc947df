//! Caret-pointer diagnostics shared by every compile stage.

use std::fmt;

/// The compile stage that produced a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lex,
    Parse,
    Semantic,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Lex => "lex",
            Stage::Parse => "parse",
            Stage::Semantic => "semantic",
        })
    }
}

/// A renderable error report.
///
/// Renders as the message, then the input line and a line of `~` ending in
/// a `^` under the offending column:
///
/// ```text
/// parse error: unexpected END_OF_INPUT, expected PAREN_CLOSE
/// (a=b
/// ~~~~^
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic<'a> {
    pub stage: Stage,
    pub message: String,
    pub line: Option<&'a str>,
    /// Byte offset into `line`.
    pub offset: Option<usize>,
}

impl Diagnostic<'_> {
    /// Returns the caret column, counted in characters.
    #[must_use]
    pub fn column(&self) -> Option<usize> {
        let offset = self.offset?;
        Some(match self.line {
            Some(line) => char_column(line, offset),
            None => offset,
        })
    }
}

/// Converts a byte offset into a character column, clamping offsets that
/// fall past the end or inside a multi-byte character.
fn char_column(line: &str, offset: usize) -> usize {
    line.char_indices()
        .take_while(|&(index, _)| index < offset)
        .count()
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.stage, self.message)?;
        if let (Some(line), Some(column)) = (self.line, self.column()) {
            write!(f, "\n{line}\n{}^", "~".repeat(column))?;
        }
        Ok(())
    }
}
