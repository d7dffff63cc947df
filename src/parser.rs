use super::{
    ast::AstNode,
    diagnostic::{Diagnostic, Stage},
    lexer::{PosToken, Token, TokenKind, TokenStream},
};

/// The deepest nesting of `(` and `!` the parser accepts.
pub const MAX_DEPTH: usize = 200;

const VALUE_START: &[TokenKind] = &[
    TokenKind::ParenOpen,
    TokenKind::Bang,
    TokenKind::Literal,
    TokenKind::Regex,
    TokenKind::DoubleQuoted,
    TokenKind::SingleQuoted,
];

/// Tokens that may follow a complete `FACT`.
const FACT_FOLLOW: &[TokenKind] = &[
    TokenKind::Or,
    TokenKind::Xor,
    TokenKind::And,
    TokenKind::Equal,
    TokenKind::BangEqual,
    TokenKind::ParenClose,
    TokenKind::EndOfInput,
];

/// The kind of a [`ParseError`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    /// A token of an unexpected kind was encountered.
    #[error("unexpected {found}, expected {}", expected_list(.expected))]
    UnexpectedToken {
        expected: Vec<TokenKind>,
        found: Token,
    },
    /// Parentheses or negations are nested too deeply.
    #[error("unexpected {found}, nesting deeper than {MAX_DEPTH}")]
    TooDeep { found: Token },
}

fn expected_list(expected: &[TokenKind]) -> String {
    match expected {
        [] => "nothing".to_owned(),
        [kind] => kind.to_string(),
        kinds => {
            let names: Vec<_> = kinds.iter().map(|kind| kind.name()).collect();
            format!("one of {}", names.join(", "))
        }
    }
}

/// The error type returned by [`parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {pos}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Offset of the offending token: a byte offset into the source line, or
    /// a token index when the stream has no source.
    pub pos: usize,
    /// The input line, when the tokens came from the lexer.
    pub line: Option<String>,
}

impl ParseError {
    /// The token kinds that would have been accepted.
    #[must_use]
    pub fn expected(&self) -> &[TokenKind] {
        match &self.kind {
            ParseErrorKind::UnexpectedToken { expected, .. } => expected,
            ParseErrorKind::TooDeep { .. } => &[],
        }
    }

    /// The offending token.
    #[must_use]
    pub fn found(&self) -> &Token {
        match &self.kind {
            ParseErrorKind::UnexpectedToken { found, .. } | ParseErrorKind::TooDeep { found } => {
                found
            }
        }
    }

    #[must_use]
    pub fn diagnostic(&self) -> Diagnostic<'_> {
        Diagnostic {
            stage: Stage::Parse,
            message: self.kind.to_string(),
            line: self.line.as_deref(),
            offset: Some(self.pos),
        }
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// Parses a token stream into an [`AstNode`].
///
/// The grammar, from loosest to tightest binding:
///
/// ```text
/// EXP   -> TERM EXP'
/// EXP'  -> OR TERM EXP' | XOR TERM EXP' | ε
/// TERM  -> FACT TERM'
/// TERM' -> AND FACT TERM' | ε
/// FACT  -> VALUE FACT'
/// FACT' -> EQUAL VALUE FACT' | BANG_EQUAL VALUE FACT' | ε
/// VALUE -> PAREN_OPEN EXP PAREN_CLOSE | BANG VALUE
///        | LITERAL | REGEX | DOUBLE_QUOTED | SINGLE_QUOTED
/// ```
///
/// # Errors
///
/// If the tokens do not form exactly one expression, a [`ParseError`] is
/// returned.
pub fn parse(tokens: &TokenStream) -> Result<AstNode> {
    Parser::new(tokens).parse()
}

/// Converts a token stream into an AST.
pub struct Parser<'a> {
    tokens: &'a [PosToken],
    source: Option<&'a str>,
    cursor: usize,
    depth: usize,
    /// Offsets of the `=` and `!=` operators consumed so far.
    comparisons: Vec<usize>,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(tokens: &'a TokenStream) -> Self {
        Parser {
            tokens: tokens.as_slice(),
            source: tokens.source(),
            cursor: 0,
            depth: 0,
            comparisons: Vec::new(),
        }
    }

    /// Parses one expression followed by end of input, consuming the parser.
    ///
    /// # Errors
    ///
    /// If the tokens do not form exactly one expression, a [`ParseError`] is
    /// returned.
    pub fn parse(self) -> Result<AstNode> {
        self.parse_with_comparisons().map(|(ast, _)| ast)
    }

    /// Like [`Parser::parse`], but also returns the offsets of every `=` and
    /// `!=` operator in source order.
    ///
    /// Source order is the in-order position of the comparison nodes in the
    /// returned tree, which is how [`SemanticError::locate`] finds the
    /// offending operator.
    ///
    /// [`SemanticError::locate`]: crate::SemanticError::locate
    ///
    /// # Errors
    ///
    /// If the tokens do not form exactly one expression, a [`ParseError`] is
    /// returned.
    pub fn parse_with_comparisons(mut self) -> Result<(AstNode, Vec<usize>)> {
        let ast = self.exp()?;
        self.accept(TokenKind::EndOfInput)?;
        Ok((ast, self.comparisons))
    }

    fn peek(&self) -> &'a PosToken {
        // The stream always ends with end of input and the cursor never
        // moves past it.
        let tokens = self.tokens;
        &tokens[self.cursor.min(tokens.len() - 1)]
    }

    fn advance(&mut self) -> &'a PosToken {
        let token = self.peek();
        if token.kind != TokenKind::EndOfInput {
            self.cursor += 1;
        }
        token
    }

    /// Consumes the next token if it is of the `expected` kind.
    fn accept(&mut self, expected: TokenKind) -> Result<&'a PosToken> {
        if self.peek().kind == expected {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&[expected]))
        }
    }

    fn unexpected(&self, expected: &[TokenKind]) -> ParseError {
        let PosToken { pos, token } = self.peek();
        let expected = expected
            .iter()
            .copied()
            .filter(|&kind| cfg!(feature = "xor") || kind != TokenKind::Xor)
            .collect();
        let kind = ParseErrorKind::UnexpectedToken {
            expected,
            found: token.clone(),
        };
        self.error(kind, *pos)
    }

    fn error(&self, kind: ParseErrorKind, pos: usize) -> ParseError {
        ParseError {
            kind,
            pos,
            line: self.source.map(str::to_owned),
        }
    }

    fn exp(&mut self) -> Result<AstNode> {
        log::trace!(target: "tagfilter::parser", "EXP at {}", self.peek().pos);
        let left = self.term()?;
        self.exp_tail(left)
    }

    fn exp_tail(&mut self, mut left: AstNode) -> Result<AstNode> {
        loop {
            log::trace!(target: "tagfilter::parser", "EXP' at {}", self.peek().pos);
            let combine: fn(AstNode, AstNode) -> AstNode = match self.peek().kind {
                TokenKind::Or => AstNode::or,
                TokenKind::Xor if cfg!(feature = "xor") => AstNode::xor,
                TokenKind::EndOfInput | TokenKind::ParenClose => return Ok(left),
                _ => return Err(self.unexpected(FACT_FOLLOW)),
            };
            self.advance();
            let right = self.term()?;
            left = combine(left, right);
        }
    }

    fn term(&mut self) -> Result<AstNode> {
        log::trace!(target: "tagfilter::parser", "TERM at {}", self.peek().pos);
        let left = self.fact()?;
        self.term_tail(left)
    }

    fn term_tail(&mut self, mut left: AstNode) -> Result<AstNode> {
        while self.peek().kind == TokenKind::And {
            log::trace!(target: "tagfilter::parser", "TERM' at {}", self.peek().pos);
            self.advance();
            let right = self.fact()?;
            left = AstNode::and(left, right);
        }
        Ok(left)
    }

    fn fact(&mut self) -> Result<AstNode> {
        log::trace!(target: "tagfilter::parser", "FACT at {}", self.peek().pos);
        let left = self.value()?;
        self.fact_tail(left)
    }

    fn fact_tail(&mut self, mut left: AstNode) -> Result<AstNode> {
        loop {
            let combine: fn(AstNode, AstNode) -> AstNode = match self.peek().kind {
                TokenKind::Equal => AstNode::equals,
                TokenKind::BangEqual => AstNode::not_equals,
                _ => return Ok(left),
            };
            log::trace!(target: "tagfilter::parser", "FACT' at {}", self.peek().pos);
            let operator = self.advance();
            self.comparisons.push(operator.pos);
            let right = self.value()?;
            left = combine(left, right);
        }
    }

    fn value(&mut self) -> Result<AstNode> {
        log::trace!(target: "tagfilter::parser", "VALUE at {}", self.peek().pos);
        let PosToken { pos, token } = self.peek();

        match token.kind {
            TokenKind::ParenOpen | TokenKind::Bang => {
                if self.depth >= MAX_DEPTH {
                    let kind = ParseErrorKind::TooDeep {
                        found: token.clone(),
                    };
                    return Err(self.error(kind, *pos));
                }
                self.advance();
                self.depth += 1;
                let node = if token.kind == TokenKind::ParenOpen {
                    self.exp().and_then(|node| {
                        self.accept(TokenKind::ParenClose)?;
                        Ok(node)
                    })
                } else {
                    self.value().map(AstNode::not)
                };
                self.depth -= 1;
                node
            }
            TokenKind::Literal | TokenKind::DoubleQuoted | TokenKind::SingleQuoted => {
                self.advance();
                Ok(AstNode::literal(token.text().unwrap_or_default()))
            }
            TokenKind::Regex => {
                self.advance();
                Ok(AstNode::regex(token.text().unwrap_or_default()))
            }
            _ => Err(self.unexpected(VALUE_START)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_list_formats() {
        assert_eq!(expected_list(&[TokenKind::ParenClose]), "PAREN_CLOSE");
        assert_eq!(
            expected_list(&[TokenKind::Literal, TokenKind::Regex]),
            "one of LITERAL, REGEX"
        );
    }

    #[test]
    fn cursor_stops_at_end_of_input() {
        let tokens = TokenStream::from_tokens([Token::new(TokenKind::Literal, "a")]);
        let mut parser = Parser::new(&tokens);
        assert_eq!(parser.advance().kind, TokenKind::Literal);
        assert_eq!(parser.advance().kind, TokenKind::EndOfInput);
        assert_eq!(parser.advance().kind, TokenKind::EndOfInput);
        assert_eq!(parser.cursor, 1);
    }

    #[test]
    fn records_comparison_offsets() {
        let tokens = crate::lex("a = (b != c) | d=e").unwrap();
        let (_, comparisons) = Parser::new(&tokens).parse_with_comparisons().unwrap();
        assert_eq!(comparisons, [2, 7, 16]);
    }
}
