//! Filter expression lexer.

use super::diagnostic::{Diagnostic, Stage};

pub mod token;

pub use token::{PosToken, Token, TokenKind, TokenStream};

/// The kind of a [`LexError`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    /// A character that cannot start any token.
    #[error("unexpected character '{}'", _0.escape_debug())]
    UnexpectedChar(char),
    /// A `\` was the last character of a literal.
    #[error("unexpected end of input after escape")]
    EndAfterEscape,
    /// The input ended before the closing `/` of a regex.
    #[error("unexpected end of input in regex")]
    UnterminatedRegex,
    /// The input ended before the closing quote of a quoted literal.
    #[error("unexpected end of input in quoted literal (missing {0})")]
    UnterminatedQuote(char),
}

/// The error type returned by [`lex`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {pos}")]
pub struct LexError {
    pub kind: LexErrorKind,
    /// Byte offset of the scanner when the error occurred.
    pub pos: usize,
    /// The input line being lexed.
    pub line: String,
}

impl LexError {
    #[must_use]
    pub fn diagnostic(&self) -> Diagnostic<'_> {
        Diagnostic {
            stage: Stage::Lex,
            message: self.kind.to_string(),
            line: Some(&self.line),
            offset: Some(self.pos),
        }
    }
}

pub type Result<T> = std::result::Result<T, LexError>;

const ESCAPE: char = '\\';
const REGEX_DELIMITER: char = '/';

fn is_operator_char(c: char) -> bool {
    matches!(c, '&' | '|' | '(' | ')' | '=' | '!') || (cfg!(feature = "xor") && c == '^')
}

/// Returns whether `c` ends an unquoted literal.
#[must_use]
pub fn is_stop_char(c: char) -> bool {
    is_operator_char(c)
        || matches!(c, ESCAPE | REGEX_DELIMITER | '"' | '\'')
        || c.is_whitespace()
        || c.is_control()
}

/// Splits `input` into tokens, dropping whitespace and appending an
/// end-of-input token.
///
/// # Errors
///
/// If the input contains an unexpected character, an unterminated regex or
/// quoted literal, or ends with an escape, a [`LexError`] is returned.
pub fn lex(input: &str) -> Result<TokenStream> {
    let tokens = Lexer::new(input)
        .filter(|token| !matches!(token, Ok(t) if t.kind == TokenKind::Whitespace))
        .collect::<Result<Vec<_>>>()?;
    log::trace!(target: "tagfilter::lexer", "{} tokens from {input:?}", tokens.len());
    Ok(TokenStream::with_source(tokens, input))
}

/// A single-pass scanner over one input line.
///
/// Yields every token including whitespace; [`lex`] is the usual entry point.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Lexer { input, pos: 0 }
    }

    /// Returns the current byte offset.
    #[must_use]
    pub fn tell(&self) -> usize {
        self.pos
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Pushes back `c`, which must be the last character returned by
    /// [`Self::advance`].
    fn unconsume(&mut self, c: char) {
        self.pos -= c.len_utf8();
    }

    fn error(&self, kind: LexErrorKind, pos: usize) -> LexError {
        LexError {
            kind,
            pos,
            line: self.input.to_owned(),
        }
    }

    pub fn next_token(&mut self) -> Result<Option<PosToken>> {
        let start = self.pos;
        let Some(c) = self.advance() else {
            return Ok(None);
        };

        let token = match c {
            c if c.is_whitespace() => self.whitespace(start),
            '&' => Token::op(TokenKind::And),
            '|' => Token::op(TokenKind::Or),
            '^' if cfg!(feature = "xor") => Token::op(TokenKind::Xor),
            '(' => Token::op(TokenKind::ParenOpen),
            ')' => Token::op(TokenKind::ParenClose),
            '=' => Token::op(TokenKind::Equal),
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Token::op(TokenKind::BangEqual)
                } else {
                    Token::op(TokenKind::Bang)
                }
            }
            REGEX_DELIMITER => self.regex()?,
            '"' => self.quoted(c, TokenKind::DoubleQuoted)?,
            '\'' => self.quoted(c, TokenKind::SingleQuoted)?,
            c if c.is_control() => {
                return Err(self.error(LexErrorKind::UnexpectedChar(c), start));
            }
            c => {
                self.unconsume(c);
                self.literal()?
            }
        };

        Ok(Some(PosToken { pos: start, token }))
    }

    fn whitespace(&mut self, start: usize) -> Token {
        while let Some(c) = self.advance() {
            if !c.is_whitespace() {
                self.unconsume(c);
                break;
            }
        }
        Token::new(TokenKind::Whitespace, &self.input[start..self.pos])
    }

    fn literal(&mut self) -> Result<Token> {
        let mut text = String::new();
        while let Some(c) = self.advance() {
            match c {
                ESCAPE => match self.advance() {
                    Some(escaped) => text.push(escaped),
                    None => return Err(self.error(LexErrorKind::EndAfterEscape, self.pos)),
                },
                c if is_stop_char(c) => {
                    self.unconsume(c);
                    break;
                }
                c => text.push(c),
            }
        }
        Ok(Token::new(TokenKind::Literal, text))
    }

    /// Scans a regex after its opening delimiter. Escapes are kept verbatim
    /// so the regex engine sees them.
    fn regex(&mut self) -> Result<Token> {
        let mut text = String::new();
        loop {
            match self.advance() {
                Some(REGEX_DELIMITER) => return Ok(Token::new(TokenKind::Regex, text)),
                Some(ESCAPE) => {
                    text.push(ESCAPE);
                    match self.advance() {
                        Some(escaped) => text.push(escaped),
                        None => return Err(self.error(LexErrorKind::UnterminatedRegex, self.pos)),
                    }
                }
                Some(c) => text.push(c),
                None => return Err(self.error(LexErrorKind::UnterminatedRegex, self.pos)),
            }
        }
    }

    /// Scans quoted text after its opening `quote`, resolving escapes.
    fn quoted(&mut self, quote: char, kind: TokenKind) -> Result<Token> {
        let mut text = String::new();
        loop {
            match self.advance() {
                Some(c) if c == quote => return Ok(Token::new(kind, text)),
                Some(ESCAPE) => match self.advance() {
                    Some(escaped) => text.push(escaped),
                    None => {
                        return Err(self.error(LexErrorKind::UnterminatedQuote(quote), self.pos));
                    }
                },
                Some(c) => text.push(c),
                None => return Err(self.error(LexErrorKind::UnterminatedQuote(quote), self.pos)),
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<PosToken>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => None,
            Err(e) => {
                // Errors are terminal.
                self.pos = self.input.len();
                Some(Err(e))
            }
        }
    }
}
