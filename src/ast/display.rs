//! Canonical expression rendering for [`AstNode`].
//!
//! The output lexes and parses back to an identical tree. Parentheses appear
//! only where operator precedence needs them.

use super::AstNode;
use crate::lexer::is_stop_char;
use std::fmt::{self, Write as _};

/// Binding strength of each node, from loosest to tightest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// `|` and `^`
    Or,
    /// `&`
    And,
    /// `=` and `!=`
    Equality,
    /// `!`, literals and regexes
    Value,
}

impl AstNode {
    #[must_use]
    pub fn precedence(&self) -> Precedence {
        match self {
            AstNode::Or(..) | AstNode::Xor(..) => Precedence::Or,
            AstNode::And(..) => Precedence::And,
            AstNode::Equals(..) | AstNode::NotEquals(..) => Precedence::Equality,
            AstNode::Not(_) | AstNode::Literal(_) | AstNode::Regex(_) => Precedence::Value,
        }
    }
}

fn write_literal(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    if text.is_empty() {
        return f.write_str("\"\"");
    }
    for c in text.chars() {
        if is_stop_char(c) || c == '^' {
            f.write_char('\\')?;
        }
        f.write_char(c)?;
    }
    Ok(())
}

/// Pending output of the printer's work stack.
enum Piece<'a> {
    Node(&'a AstNode),
    Text(&'static str),
    Operator(&'static str),
}

fn push_operand<'a>(pending: &mut Vec<Piece<'a>>, node: &'a AstNode, parens: bool) {
    if parens {
        pending.extend([Piece::Text(")"), Piece::Node(node), Piece::Text("(")]);
    } else {
        pending.push(Piece::Node(node));
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Pieces are pushed in reverse so they pop in output order.
        let mut pending = vec![Piece::Node(self)];
        while let Some(piece) = pending.pop() {
            let node = match piece {
                Piece::Node(node) => node,
                Piece::Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
                Piece::Operator(op) => {
                    write!(f, " {op} ")?;
                    continue;
                }
            };
            match node {
                AstNode::Literal(text) => write_literal(f, text)?,
                AstNode::Regex(pattern) => write!(f, "/{pattern}/")?,
                AstNode::Not(operand) => {
                    f.write_str("!")?;
                    let parens = !operand.is_leaf() && !matches!(**operand, AstNode::Not(_));
                    push_operand(&mut pending, operand, parens);
                }
                AstNode::And(left, right)
                | AstNode::Or(left, right)
                | AstNode::Xor(left, right)
                | AstNode::Equals(left, right)
                | AstNode::NotEquals(left, right) => {
                    let precedence = node.precedence();
                    push_operand(&mut pending, right, right.precedence() <= precedence);
                    pending.push(Piece::Operator(node.operator().unwrap_or_default()));
                    push_operand(&mut pending, left, left.precedence() < precedence);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(text: &str) -> AstNode {
        AstNode::literal(text)
    }

    #[test]
    fn escapes_stop_chars_in_literals() {
        assert_eq!(lit("a=b").to_string(), "a\\=b");
        assert_eq!(lit("two words").to_string(), "two\\ words");
        assert_eq!(lit("x^y").to_string(), "x\\^y");
        assert_eq!(lit("").to_string(), "\"\"");
    }

    #[test]
    fn keeps_regex_escapes() {
        assert_eq!(AstNode::regex("a\\/b").to_string(), "/a\\/b/");
    }

    #[test]
    fn parenthesizes_by_precedence() {
        let tree = AstNode::and(
            AstNode::or(lit("a"), lit("b")),
            AstNode::equals(lit("c"), lit("d")),
        );
        assert_eq!(tree.to_string(), "(a | b) & c = d");

        let tree = AstNode::or(lit("a"), AstNode::or(lit("b"), lit("c")));
        assert_eq!(tree.to_string(), "a | (b | c)");

        let tree = AstNode::or(AstNode::or(lit("a"), lit("b")), lit("c"));
        assert_eq!(tree.to_string(), "a | b | c");
    }

    #[test]
    fn negation_wraps_compound_operands() {
        assert_eq!(AstNode::not(lit("a")).to_string(), "!a");
        assert_eq!(AstNode::not(AstNode::not(lit("a"))).to_string(), "!!a");
        assert_eq!(
            AstNode::not(AstNode::equals(lit("a"), lit("b"))).to_string(),
            "!(a = b)"
        );
    }

    #[test]
    fn prints_long_chains() {
        let chain = (0..100_000).fold(lit("a"), |left, _| AstNode::and(left, lit("a")));
        let printed = chain.to_string();
        assert_eq!(printed.len(), 100_001 + 100_000 * 3);
        assert!(printed.starts_with("a & a & a"));
    }
}
