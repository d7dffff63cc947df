use rstest::rstest;
use tagfilter::{
    LexError, LexErrorKind, Lexer, Token, TokenKind,
    lexer::{Result, lex},
};

fn lit(text: &str) -> Token {
    Token::new(TokenKind::Literal, text)
}

fn op(kind: TokenKind) -> Token {
    Token::op(kind)
}

fn lex_err(input: &str) -> LexError {
    lex(input).expect_err(&format!("lexer accepted {input:?}"))
}

#[test]
fn test_basic_tokens_lexer() -> Result<()> {
    assert_eq!(
        lex("highway=primary")?,
        [lit("highway"), op(TokenKind::Equal), lit("primary")]
    );
    assert_eq!(
        lex("&|()=!!=")?,
        [
            op(TokenKind::And),
            op(TokenKind::Or),
            op(TokenKind::ParenOpen),
            op(TokenKind::ParenClose),
            op(TokenKind::Equal),
            op(TokenKind::Bang),
            op(TokenKind::BangEqual),
        ]
    );
    Ok(())
}

#[test]
fn test_bang_lookahead_lexer() -> Result<()> {
    assert_eq!(lex("a!=b")?, [lit("a"), op(TokenKind::BangEqual), lit("b")]);
    assert_eq!(
        lex("!a = b")?,
        [op(TokenKind::Bang), lit("a"), op(TokenKind::Equal), lit("b")]
    );
    assert_eq!(lex("! =")?, [op(TokenKind::Bang), op(TokenKind::Equal)]);
    Ok(())
}

#[test]
fn test_whitespace_is_dropped_lexer() -> Result<()> {
    assert_eq!(lex("a & b")?, lex("a&b")?);
    assert_eq!(
        lex("  a \t&\n b  ")?,
        [lit("a"), op(TokenKind::And), lit("b")]
    );
    assert!(lex("")?.is_empty());
    assert!(lex("   ")?.is_empty());
    Ok(())
}

#[test]
fn test_whitespace_tokens_are_scanned_lexer() {
    let kinds: Vec<_> = Lexer::new("a  b")
        .map(|token| token.map(|t| t.kind))
        .collect::<Result<_>>()
        .unwrap();
    assert_eq!(
        kinds,
        [TokenKind::Literal, TokenKind::Whitespace, TokenKind::Literal]
    );
}

#[test]
fn test_positions_lexer() -> Result<()> {
    let tokens = lex("ab = 'c d'")?;
    let positions: Vec<_> = tokens.as_slice().iter().map(|t| t.pos).collect();
    assert_eq!(positions, [0, 3, 5, 10]);
    assert_eq!(tokens.as_slice().last().map(|t| t.kind), Some(TokenKind::EndOfInput));
    assert_eq!(tokens.source(), Some("ab = 'c d'"));
    Ok(())
}

#[test]
fn test_escape_tokens_lexer() -> Result<()> {
    assert_eq!(lex("a\\=b")?, [lit("a=b")]);
    assert_eq!(lex("\\(x\\)")?, [lit("(x)")]);
    assert_eq!(lex("two\\ words")?, [lit("two words")]);
    assert_eq!(lex("back\\\\slash")?, [lit("back\\slash")]);
    assert_eq!(lex("\\a")?, [lit("a")]);
    Ok(())
}

#[test]
fn test_literal_stops_at_delimiters_lexer() -> Result<()> {
    assert_eq!(
        lex("a\"b\"")?,
        [lit("a"), Token::new(TokenKind::DoubleQuoted, "b")]
    );
    assert_eq!(lex("a/b/")?, [lit("a"), Token::new(TokenKind::Regex, "b")]);
    assert_eq!(
        lex("name:en=Zürich")?,
        [lit("name:en"), op(TokenKind::Equal), lit("Zürich")]
    );
    Ok(())
}

#[test]
fn test_regex_tokens_lexer() -> Result<()> {
    assert_eq!(lex("/a\\/b/")?, [Token::new(TokenKind::Regex, "a\\/b")]);
    assert_eq!(lex("/^A.*$/")?, [Token::new(TokenKind::Regex, "^A.*$")]);
    assert_eq!(lex("/\\d+/")?, [Token::new(TokenKind::Regex, "\\d+")]);
    assert_eq!(lex("/a\\\\/")?, [Token::new(TokenKind::Regex, "a\\\\")]);
    assert_eq!(lex("//")?, [Token::new(TokenKind::Regex, "")]);
    assert_eq!(lex("/a b/")?, [Token::new(TokenKind::Regex, "a b")]);
    Ok(())
}

#[test]
fn test_quoted_tokens_lexer() -> Result<()> {
    assert_eq!(
        lex("\"a & b\"")?,
        [Token::new(TokenKind::DoubleQuoted, "a & b")]
    );
    assert_eq!(
        lex("'it\\'s'")?,
        [Token::new(TokenKind::SingleQuoted, "it's")]
    );
    assert_eq!(
        lex("\"say \\\"hi\\\"\"")?,
        [Token::new(TokenKind::DoubleQuoted, "say \"hi\"")]
    );
    assert_eq!(lex("'\"'")?, [Token::new(TokenKind::SingleQuoted, "\"")]);
    assert_eq!(lex("''")?, [Token::new(TokenKind::SingleQuoted, "")]);
    Ok(())
}

#[test]
fn test_token_equality_ignores_position() -> Result<()> {
    let spaced = lex("  a")?;
    let packed = lex("a")?;
    assert_eq!(spaced.tokens(), packed.tokens());
    assert_ne!(spaced.tokens()[0].pos, packed.tokens()[0].pos);
    Ok(())
}

#[cfg(feature = "xor")]
#[test]
fn test_xor_token_lexer() -> Result<()> {
    assert_eq!(lex("a^b")?, [lit("a"), op(TokenKind::Xor), lit("b")]);
    Ok(())
}

#[cfg(not(feature = "xor"))]
#[test]
fn test_caret_is_literal_without_xor_lexer() -> Result<()> {
    assert_eq!(lex("a^b")?, [lit("a^b")]);
    Ok(())
}

#[rstest]
#[case::escape_at_end("abc\\", LexErrorKind::EndAfterEscape, 4)]
#[case::lone_escape("\\", LexErrorKind::EndAfterEscape, 1)]
#[case::unterminated_regex("k=/abc", LexErrorKind::UnterminatedRegex, 6)]
#[case::regex_ends_with_escape("/abc\\", LexErrorKind::UnterminatedRegex, 5)]
#[case::unterminated_double("\"abc", LexErrorKind::UnterminatedQuote('"'), 4)]
#[case::unterminated_single("'abc\\'", LexErrorKind::UnterminatedQuote('\''), 6)]
#[case::control_char("a\u{7}b", LexErrorKind::UnexpectedChar('\u{7}'), 1)]
fn test_lexer_errors(#[case] input: &str, #[case] kind: LexErrorKind, #[case] pos: usize) {
    let err = lex_err(input);
    assert_eq!(err.kind, kind);
    assert_eq!(err.pos, pos);
    assert_eq!(err.line, input);
}

#[test]
fn test_lexer_error_diagnostic() {
    let err = lex_err("name=\"Main St");
    assert_eq!(
        err.diagnostic().to_string(),
        "lex error: unexpected end of input in quoted literal (missing \")\n\
         name=\"Main St\n\
         ~~~~~~~~~~~~~^"
    );
    assert_eq!(
        err.to_string(),
        "unexpected end of input in quoted literal (missing \") at 13"
    );
}

#[test]
fn test_lexer_stops_after_error() {
    let results: Vec<_> = Lexer::new("a\u{0}b").collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
}
