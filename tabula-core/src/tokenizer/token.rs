//! Core token types and the tokenizer loop.
//!
//! The tokenizer walks the snippet source with nom parsers, emitting one
//! [`TokenSpan`] per lexeme. Whitespace, newlines, and comments are kept as
//! tokens (the parser filters them), so spans always describe the original
//! source for error reporting.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    combinator::{map, recognize},
    error::{VerboseError, context},
    sequence::{pair, preceded},
};
use thiserror::Error;

use super::{
    keyword::{Keyword, parse_keyword},
    literal::{Literal, parse_literal},
    symbol::{Delimiter, Operator, parse_delimiter, parse_operator},
};

pub type ParserResult<'a, O> = nom::IResult<&'a str, O, VerboseError<&'a str>>;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Keyword(Keyword),
    Identifier(String),
    Operator(Operator),
    Delimiter(Delimiter),
    Literal(Literal),
    Whitespace(String),
    Newline,
    Comment(String),
}

impl Token {
    /// Formatting tokens are skipped by the parser.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            Token::Whitespace(_) | Token::Newline | Token::Comment(_)
        )
    }
}

/// Source position of a token, 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenSpan {
    pub token: Token,
    pub span: Span,
}

#[derive(Debug, Error)]
pub enum TokenizeError {
    #[error("Unrecognized input at line {line}, column {column}: {found:?}")]
    Unrecognized {
        found: String,
        line: usize,
        column: usize,
    },
}

pub type TokenizeResult<T> = Result<T, TokenizeError>;

fn parse_identifier(input: &str) -> ParserResult<'_, Token> {
    context(
        "identifier",
        map(
            recognize(pair(
                take_while1(|c: char| c.is_alphabetic() || c == '_'),
                take_while(|c: char| c.is_alphanumeric() || c == '_'),
            )),
            |ident: &str| Token::Identifier(ident.to_string()),
        ),
    )(input)
}

fn parse_whitespace(input: &str) -> ParserResult<'_, Token> {
    context(
        "whitespace",
        map(take_while1(|c| c == ' ' || c == '\t'), |ws: &str| {
            Token::Whitespace(ws.to_string())
        }),
    )(input)
}

fn parse_newline(input: &str) -> ParserResult<'_, Token> {
    context(
        "newline",
        map(alt((tag("\r\n"), tag("\n"))), |_| Token::Newline),
    )(input)
}

/// Line comments; both `//` and `#` forms appear in model output.
fn parse_comment(input: &str) -> ParserResult<'_, Token> {
    context(
        "comment",
        map(
            preceded(
                alt((tag("//"), tag("#"))),
                take_while(|c| c != '\n' && c != '\r'),
            ),
            |content: &str| Token::Comment(content.trim().to_string()),
        ),
    )(input)
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    current_position: usize,
    current_line: usize,
    current_column: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            current_position: 0,
            current_line: 1,
            current_column: 1,
        }
    }

    pub fn tokenize(&mut self, input: &str) -> TokenizeResult<Vec<TokenSpan>> {
        let mut tokens = Vec::new();
        let mut remaining = input;

        while !remaining.is_empty() {
            let start = Span {
                start: self.current_position,
                end: self.current_position,
                line: self.current_line,
                column: self.current_column,
            };

            let result = alt((
                parse_whitespace,
                parse_newline,
                parse_comment,
                parse_literal,
                parse_keyword,
                parse_operator,
                parse_delimiter,
                parse_identifier,
            ))(remaining);

            match result {
                Ok((new_remaining, token)) => {
                    let consumed = &remaining[..(remaining.len() - new_remaining.len())];
                    self.update_position(consumed);
                    tokens.push(TokenSpan {
                        token,
                        span: Span {
                            end: self.current_position,
                            ..start
                        },
                    });
                    remaining = new_remaining;
                }
                Err(_) => {
                    let found = remaining.chars().take(20).collect::<String>();
                    return Err(TokenizeError::Unrecognized {
                        found,
                        line: self.current_line,
                        column: self.current_column,
                    });
                }
            }
        }

        Ok(tokens)
    }

    fn update_position(&mut self, text: &str) {
        for c in text.chars() {
            self.current_position += c.len_utf8();
            if c == '\n' {
                self.current_line += 1;
                self.current_column = 1;
            } else {
                self.current_column += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens_of(input: &str) -> Vec<Token> {
        Tokenizer::new()
            .tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .filter(|t| !t.is_trivia())
            .collect()
    }

    #[test]
    fn test_tokenize_function_header() {
        assert_eq!(
            tokens_of("fn answer(table) {"),
            vec![
                Token::Keyword(Keyword::Fn),
                Token::Identifier("answer".into()),
                Token::Delimiter(Delimiter::OpenParen),
                Token::Identifier("table".into()),
                Token::Delimiter(Delimiter::CloseParen),
                Token::Delimiter(Delimiter::OpenBrace),
            ]
        );
    }

    #[test]
    fn test_tokenize_expression() {
        assert_eq!(
            tokens_of(r#"let m = table["age"].mean();"#),
            vec![
                Token::Keyword(Keyword::Let),
                Token::Identifier("m".into()),
                Token::Delimiter(Delimiter::Equal),
                Token::Identifier("table".into()),
                Token::Delimiter(Delimiter::OpenBracket),
                Token::Literal(Literal::String("age".into())),
                Token::Delimiter(Delimiter::CloseBracket),
                Token::Operator(Operator::Dot),
                Token::Identifier("mean".into()),
                Token::Delimiter(Delimiter::OpenParen),
                Token::Delimiter(Delimiter::CloseParen),
                Token::Delimiter(Delimiter::Semicolon),
            ]
        );
    }

    #[test]
    fn test_comments_are_trivia() {
        assert_eq!(
            tokens_of("# header\nlet x = 1; // trailing"),
            vec![
                Token::Keyword(Keyword::Let),
                Token::Identifier("x".into()),
                Token::Delimiter(Delimiter::Equal),
                Token::Literal(Literal::Integer(1)),
                Token::Delimiter(Delimiter::Semicolon),
            ]
        );
    }

    #[test]
    fn test_spans_track_lines() {
        let spans = Tokenizer::new().tokenize("let x = 1;\nlet y = 2;").unwrap();
        let second_let = spans
            .iter()
            .filter(|t| t.token == Token::Keyword(Keyword::Let))
            .nth(1)
            .unwrap();
        assert_eq!(second_let.span.line, 2);
        assert_eq!(second_let.span.column, 1);
    }

    #[test]
    fn test_unrecognized_input() {
        let err = Tokenizer::new().tokenize("let x = @;").unwrap_err();
        assert!(matches!(err, TokenizeError::Unrecognized { .. }));
    }

    #[test]
    fn test_minus_stays_an_operator() {
        assert_eq!(
            tokens_of("x-3"),
            vec![
                Token::Identifier("x".into()),
                Token::Operator(Operator::Minus),
                Token::Literal(Literal::Integer(3)),
            ]
        );
    }
}
