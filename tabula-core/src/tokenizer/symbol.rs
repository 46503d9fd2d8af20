//! Operator and delimiter tokens.
//!
//! Multi-character operators are matched before their single-character
//! prefixes so `>=` never tokenizes as `>` `=`.

use strum_macros::{AsRefStr, Display, EnumString};

use nom::{branch::alt, bytes::complete::tag, combinator::map, combinator::value, error::context};

use super::token::{ParserResult, Token};

/// Operators of the snippet language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
pub enum Operator {
    /// Member/method access (`.`)
    #[strum(serialize = ".")]
    Dot,

    /// Equality (`==`)
    #[strum(serialize = "==")]
    EqualEqual,
    /// Inequality (`!=`)
    #[strum(serialize = "!=")]
    NotEqual,
    /// Greater than (`>`)
    #[strum(serialize = ">")]
    Greater,
    /// Greater than or equal (`>=`)
    #[strum(serialize = ">=")]
    GreaterEqual,
    /// Less than (`<`)
    #[strum(serialize = "<")]
    Less,
    /// Less than or equal (`<=`)
    #[strum(serialize = "<=")]
    LessEqual,

    /// Addition / string concatenation (`+`)
    #[strum(serialize = "+")]
    Plus,
    /// Subtraction / negation (`-`)
    #[strum(serialize = "-")]
    Minus,
    /// Multiplication (`*`)
    #[strum(serialize = "*")]
    Multiply,
    /// Division (`/`)
    #[strum(serialize = "/")]
    Divide,
    /// Remainder (`%`)
    #[strum(serialize = "%")]
    Modulo,

    /// Logical AND (`&&`)
    #[strum(serialize = "&&")]
    And,
    /// Logical OR (`||`)
    #[strum(serialize = "||")]
    Or,
    /// Logical NOT (`!`)
    #[strum(serialize = "!")]
    Not,
}

/// Structural delimiters.
// `Display` is implemented manually below rather than derived: strum's
// `Display` derive rejects the literal `{`/`}` serialize strings (it parses
// them as format-string interpolation). Forwarding to `AsRefStr` reproduces
// exactly what the derived `Display` would emit for these unit variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
pub enum Delimiter {
    /// Opening brace (`{`) for blocks and map literals
    #[strum(serialize = "{")]
    OpenBrace,
    /// Closing brace (`}`)
    #[strum(serialize = "}")]
    CloseBrace,
    /// Opening parenthesis (`(`)
    #[strum(serialize = "(")]
    OpenParen,
    /// Closing parenthesis (`)`)
    #[strum(serialize = ")")]
    CloseParen,
    /// Opening bracket (`[`) for lists and indexing
    #[strum(serialize = "[")]
    OpenBracket,
    /// Closing bracket (`]`)
    #[strum(serialize = "]")]
    CloseBracket,
    /// Comma (`,`)
    #[strum(serialize = ",")]
    Comma,
    /// Semicolon (`;`) terminating statements
    #[strum(serialize = ";")]
    Semicolon,
    /// Colon (`:`) between map keys and values
    #[strum(serialize = ":")]
    Colon,
    /// Equal sign (`=`) for bindings and assignment
    #[strum(serialize = "=")]
    Equal,
}

impl std::fmt::Display for Delimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

pub fn parse_operator(input: &str) -> ParserResult<'_, Token> {
    context(
        "operator",
        map(
            alt((
                // Multi-character operators first for longest-match.
                value(Operator::EqualEqual, tag("==")),
                value(Operator::NotEqual, tag("!=")),
                value(Operator::GreaterEqual, tag(">=")),
                value(Operator::LessEqual, tag("<=")),
                value(Operator::And, tag("&&")),
                value(Operator::Or, tag("||")),
                value(Operator::Dot, tag(".")),
                value(Operator::Greater, tag(">")),
                value(Operator::Less, tag("<")),
                value(Operator::Plus, tag("+")),
                value(Operator::Minus, tag("-")),
                value(Operator::Multiply, tag("*")),
                value(Operator::Divide, tag("/")),
                value(Operator::Modulo, tag("%")),
                value(Operator::Not, tag("!")),
            )),
            Token::Operator,
        ),
    )(input)
}

pub fn parse_delimiter(input: &str) -> ParserResult<'_, Token> {
    context(
        "delimiter",
        map(
            alt((
                value(Delimiter::OpenBrace, tag("{")),
                value(Delimiter::CloseBrace, tag("}")),
                value(Delimiter::OpenParen, tag("(")),
                value(Delimiter::CloseParen, tag(")")),
                value(Delimiter::OpenBracket, tag("[")),
                value(Delimiter::CloseBracket, tag("]")),
                value(Delimiter::Comma, tag(",")),
                value(Delimiter::Semicolon, tag(";")),
                value(Delimiter::Colon, tag(":")),
                value(Delimiter::Equal, tag("=")),
            )),
            Token::Delimiter,
        ),
    )(input)
}
