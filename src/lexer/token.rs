use std::fmt;

/// The kind of a filter expression token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// An unquoted key or value, possibly containing escapes.
    Literal,
    /// Text delimited by `/`.
    Regex,
    /// Text delimited by `"`.
    DoubleQuoted,
    /// Text delimited by `'`.
    SingleQuoted,
    /// `&`
    And,
    /// `|`
    Or,
    /// `^`
    Xor,
    /// `=`
    Equal,
    /// `!=`
    BangEqual,
    /// `!`
    Bang,
    /// `(`
    ParenOpen,
    /// `)`
    ParenClose,
    /// A run of whitespace. Never reaches the parser.
    Whitespace,
    /// The synthetic token terminating every token stream.
    EndOfInput,
}

impl TokenKind {
    /// Returns the canonical name of the kind, as used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            TokenKind::Literal => "LITERAL",
            TokenKind::Regex => "REGEX",
            TokenKind::DoubleQuoted => "DOUBLE_QUOTED",
            TokenKind::SingleQuoted => "SINGLE_QUOTED",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Xor => "XOR",
            TokenKind::Equal => "EQUAL",
            TokenKind::BangEqual => "BANG_EQUAL",
            TokenKind::Bang => "BANG",
            TokenKind::ParenOpen => "PAREN_OPEN",
            TokenKind::ParenClose => "PAREN_CLOSE",
            TokenKind::Whitespace => "WHITESPACE",
            TokenKind::EndOfInput => "END_OF_INPUT",
        }
    }

    /// Returns the fixed spelling of an operator kind, or `None` for kinds
    /// whose text comes from the input.
    #[must_use]
    pub const fn spelling(self) -> Option<&'static str> {
        match self {
            TokenKind::And => Some("&"),
            TokenKind::Or => Some("|"),
            TokenKind::Xor => Some("^"),
            TokenKind::Equal => Some("="),
            TokenKind::BangEqual => Some("!="),
            TokenKind::Bang => Some("!"),
            TokenKind::ParenOpen => Some("("),
            TokenKind::ParenClose => Some(")"),
            TokenKind::Literal
            | TokenKind::Regex
            | TokenKind::DoubleQuoted
            | TokenKind::SingleQuoted
            | TokenKind::Whitespace
            | TokenKind::EndOfInput => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A filter expression token.
///
/// Two tokens are equal when both their kind and their text are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    /// The lexeme. Escapes in literals and quoted text are already resolved.
    pub text: Option<String>,
}

impl Token {
    /// Creates a token carrying the given text.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Token {
            kind,
            text: Some(text.into()),
        }
    }

    /// Creates an operator token whose text is the kind's fixed spelling.
    #[must_use]
    pub fn op(kind: TokenKind) -> Self {
        Token {
            kind,
            text: kind.spelling().map(str::to_owned),
        }
    }

    /// Creates the synthetic end-of-input token.
    #[must_use]
    pub const fn end() -> Self {
        Token {
            kind: TokenKind::EndOfInput,
            text: None,
        }
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.text) {
            (TokenKind::EndOfInput, _) | (_, None) => write!(f, "{}", self.kind),
            (kind, Some(text)) => write!(f, "{kind} '{}'", text.escape_debug()),
        }
    }
}

/// A [`Token`] with associated position information.
#[derive(Clone, Debug, Eq)]
pub struct PosToken {
    /// The byte offset of the token in the input line.
    pub pos: usize,
    /// The token.
    pub token: Token,
}

impl core::ops::Deref for PosToken {
    type Target = Token;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl PartialEq for PosToken {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl PartialEq<Token> for PosToken {
    #[inline]
    fn eq(&self, other: &Token) -> bool {
        self.token == *other
    }
}

/// The output of the lexer: positioned tokens followed by a synthetic
/// [`TokenKind::EndOfInput`] token.
#[derive(Clone, Debug)]
pub struct TokenStream {
    tokens: Vec<PosToken>,
    source: Option<String>,
}

impl TokenStream {
    /// Builds a stream from tokens without source text. Positions are the
    /// token indexes and diagnostics carry no caret line.
    #[must_use]
    pub fn from_tokens(tokens: impl IntoIterator<Item = Token>) -> Self {
        let mut tokens: Vec<_> = tokens
            .into_iter()
            .filter(|token| token.kind != TokenKind::EndOfInput)
            .enumerate()
            .map(|(pos, token)| PosToken { pos, token })
            .collect();
        let end = tokens.len();
        tokens.push(PosToken {
            pos: end,
            token: Token::end(),
        });
        TokenStream {
            tokens,
            source: None,
        }
    }

    /// `tokens` must not contain an end-of-input token; one is appended at
    /// the byte length of `source`.
    pub(crate) fn with_source(mut tokens: Vec<PosToken>, source: &str) -> Self {
        tokens.push(PosToken {
            pos: source.len(),
            token: Token::end(),
        });
        TokenStream {
            tokens,
            source: Some(source.to_owned()),
        }
    }

    /// The input line the tokens were lexed from, if known.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// All tokens including the trailing end-of-input token.
    #[must_use]
    pub fn as_slice(&self) -> &[PosToken] {
        &self.tokens
    }

    /// The tokens without the trailing end-of-input token.
    #[must_use]
    pub fn tokens(&self) -> &[PosToken] {
        &self.tokens[..self.tokens.len() - 1]
    }

    /// Returns the kinds of every token except end-of-input.
    #[must_use]
    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens().iter().map(|t| t.kind).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len() - 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartialEq for TokenStream {
    fn eq(&self, other: &Self) -> bool {
        self.tokens == other.tokens
    }
}

impl PartialEq<[Token]> for TokenStream {
    fn eq(&self, other: &[Token]) -> bool {
        self.tokens().len() == other.len() && self.tokens().iter().zip(other).all(|(a, b)| a == b)
    }
}

impl<const N: usize> PartialEq<[Token; N]> for TokenStream {
    fn eq(&self, other: &[Token; N]) -> bool {
        *self == other[..]
    }
}
