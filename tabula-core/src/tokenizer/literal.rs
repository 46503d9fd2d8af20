//! String and number literals.
//!
//! Numbers carry no sign here; unary minus belongs to the parser, so
//! `x-3` tokenizes as identifier, operator, integer.

use nom::{
    branch::alt,
    bytes::complete::take_while,
    character::complete::{char, digit1},
    combinator::{map, map_res, recognize},
    error::context,
    sequence::{delimited, tuple},
};

use super::token::{ParserResult, Token};

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
}

fn parse_string_literal(input: &str) -> ParserResult<'_, Literal> {
    context(
        "string literal",
        map(
            delimited(
                char('"'),
                take_while(|c| c != '"' && c != '\n' && c != '\r'),
                char('"'),
            ),
            |content: &str| Literal::String(content.to_string()),
        ),
    )(input)
}

fn parse_float_literal(input: &str) -> ParserResult<'_, Literal> {
    context(
        "float literal",
        map_res(
            recognize(tuple((digit1, char('.'), digit1))),
            |s: &str| s.parse::<f64>().map(Literal::Float),
        ),
    )(input)
}

fn parse_integer_literal(input: &str) -> ParserResult<'_, Literal> {
    context(
        "integer literal",
        map_res(digit1, |s: &str| s.parse::<i64>().map(Literal::Integer)),
    )(input)
}

pub fn parse_literal(input: &str) -> ParserResult<'_, Token> {
    context(
        "literal",
        map(
            alt((
                parse_string_literal,
                parse_float_literal,
                parse_integer_literal,
            )),
            Token::Literal,
        ),
    )(input)
}
