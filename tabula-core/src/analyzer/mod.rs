//! # Analyzer Component
//!
//! Syntactic analysis for the snippet language: the token stream from the
//! tokenizer is turned into the [`crate::ast`] types by a recursive descent
//! parser. The grammar is a single function definition with statements and
//! expressions; there is no module or multi-definition surface, because the
//! snippet contract permits exactly one callable.

pub mod parser;

pub use parser::{ParseError, ParseResult, parse_snippet};
