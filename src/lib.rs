//! A front end for boolean tag-filter expressions.
//!
//! Expressions such as `highway=primary|highway=secondary & !access=private`
//! are lexed into tokens, parsed into an [`AstNode`] and checked for
//! meaningless comparisons before being handed to a matcher.
//!
//! ```
//! use tagfilter::{AstNode, compile};
//!
//! let ast = compile("amenity=cafe & !wheelchair=no").unwrap();
//! assert_eq!(
//!     ast,
//!     AstNode::and(
//!         AstNode::equals(AstNode::literal("amenity"), AstNode::literal("cafe")),
//!         AstNode::equals(
//!             AstNode::not(AstNode::literal("wheelchair")),
//!             AstNode::literal("no"),
//!         ),
//!     )
//! );
//! ```

#![warn(clippy::pedantic, rust_2018_idioms)]
#![allow(clippy::missing_errors_doc)]

pub mod ast;
pub mod checker;
pub mod diagnostic;
pub mod lexer;
pub mod parser;

pub use self::{
    ast::{AstNode, Precedence},
    checker::{SemanticError, check},
    diagnostic::{Diagnostic, Stage},
    lexer::{LexError, LexErrorKind, Lexer, PosToken, Token, TokenKind, TokenStream, lex},
    parser::{ParseError, ParseErrorKind, Parser, parse},
};

/// The error type returned by [`compile`], tagged by the failing stage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

impl CompileError {
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            CompileError::Lex(_) => Stage::Lex,
            CompileError::Parse(_) => Stage::Parse,
            CompileError::Semantic(_) => Stage::Semantic,
        }
    }

    /// Returns the caret diagnostic of the underlying error.
    #[must_use]
    pub fn diagnostic(&self) -> Diagnostic<'_> {
        match self {
            CompileError::Lex(e) => e.diagnostic(),
            CompileError::Parse(e) => e.diagnostic(),
            CompileError::Semantic(e) => e.diagnostic(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;

/// Lexes, parses and checks `input`.
///
/// # Errors
///
/// If any stage fails, its error is returned wrapped in a [`CompileError`].
pub fn compile(input: &str) -> Result<AstNode> {
    let tokens = lex(input)?;
    let (ast, comparisons) = Parser::new(&tokens).parse_with_comparisons()?;
    if let Err(err) = check(&ast) {
        return Err(err.locate(&comparisons, tokens.source()).into());
    }
    Ok(ast)
}
