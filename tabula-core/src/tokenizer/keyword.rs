//! Keyword tokens of the snippet language.
//!
//! Keywords are matched with a word boundary check so that identifiers which
//! merely start with a keyword (`lettuce`, `iffy`) are not split.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    combinator::{map, not, peek, value},
    error::context,
    sequence::terminated,
};

use super::token::{ParserResult, Token};

/// Reserved words of the snippet language.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum Keyword {
    /// Opens the single function definition.
    Fn,
    /// Binds a local variable.
    Let,
    /// Returns the answer map from the function.
    Return,
    /// Conditional statement.
    If,
    /// Alternative branch.
    Else,
    /// Fuel-bounded loop.
    While,
    /// Boolean literal `true`.
    True,
    /// Boolean literal `false`.
    False,
    /// The absent value.
    Null,
}

fn word<'a>(text: &'static str) -> impl Fn(&'a str) -> ParserResult<'a, &'a str> {
    move |input| {
        terminated(
            tag(text),
            // The next char must not extend the word.
            peek(not(take_while1(|c: char| c.is_alphanumeric() || c == '_'))),
        )(input)
    }
}

pub fn parse_keyword(input: &str) -> ParserResult<'_, Token> {
    context(
        "keyword",
        map(
            alt((
                value(Keyword::Return, word("return")),
                value(Keyword::While, word("while")),
                value(Keyword::False, word("false")),
                value(Keyword::True, word("true")),
                value(Keyword::Null, word("null")),
                value(Keyword::Else, word("else")),
                value(Keyword::Let, word("let")),
                value(Keyword::Fn, word("fn")),
                value(Keyword::If, word("if")),
            )),
            Token::Keyword,
        ),
    )(input)
}
