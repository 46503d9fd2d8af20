//! Snippet extraction from raw model output.
//!
//! Model completions arrive as free-form text: the code may be wrapped in
//! markdown fences (with or without a language tag) and surrounded by prose.
//! Extraction strips the fences, then cuts from the first `fn answer(`
//! definition header to the end of the text. Leading prose is discarded;
//! anything trailing the definition is left for the parser to reject.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[a-zA-Z0-9_-]*\n?").expect("valid fence pattern"));
static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n?```").expect("valid fence pattern"));
static DEFINITION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"fn\s+answer\s*\(").expect("valid header pattern"));

#[derive(Debug, Error)]
pub enum ExtractError {
    /// No `fn answer(` header anywhere in the completion. The raw text is
    /// carried for diagnosis; extraction never silently yields empty source.
    #[error("No `fn answer(table)` definition found in model output")]
    MissingDefinition { raw: String },
}

pub type ExtractResult<T> = Result<T, ExtractError>;

/// Isolates the snippet source from a raw completion.
pub fn extract(raw: &str) -> ExtractResult<String> {
    let without_open = OPENING_FENCE.replace_all(raw, "");
    let cleaned = CLOSING_FENCE.replace_all(&without_open, "");

    match DEFINITION_HEADER.find(&cleaned) {
        Some(found) => Ok(cleaned[found.start()..].trim().to_string()),
        None => Err(ExtractError::MissingDefinition {
            raw: raw.to_string(),
        }),
    }
}
