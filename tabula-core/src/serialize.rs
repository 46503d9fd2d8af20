//! Canonical structured answers.
//!
//! The [`StructuredAnswer`] record is what crosses the core's outward
//! boundary: plain JSON fields only, never interpreter values. Downstream
//! comparison reads `answer` / `columns_used` / `explanation` on success and
//! `error` otherwise.

use serde::{Deserialize, Serialize};

use crate::sandbox::ExecutionOutcome;

/// One JSON-shaped record per question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StructuredAnswer {
    Success {
        answer: serde_json::Value,
        #[serde(default)]
        columns_used: Vec<String>,
        #[serde(default)]
        explanation: String,
    },
    Error {
        error: String,
    },
}

impl StructuredAnswer {
    pub fn error(message: impl Into<String>) -> Self {
        StructuredAnswer::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, StructuredAnswer::Error { .. })
    }

    /// The answer as a bare string for response files and scoring; errors
    /// are surfaced as their message.
    pub fn answer_text(&self) -> String {
        match self {
            StructuredAnswer::Success { answer, .. } => match answer {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            },
            StructuredAnswer::Error { error } => error.clone(),
        }
    }

    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Converts an execution outcome into the canonical record, lowering
/// interpreter values to plain JSON.
pub fn serialize(outcome: &ExecutionOutcome) -> StructuredAnswer {
    match outcome {
        ExecutionOutcome::Success {
            answer,
            columns_used,
            explanation,
        } => StructuredAnswer::Success {
            answer: answer.to_json(),
            columns_used: columns_used.clone(),
            explanation: explanation.clone(),
        },
        ExecutionOutcome::Failure { error } => StructuredAnswer::error(error.clone()),
    }
}

/// Parses a direct (non-code) completion as a structured answer.
///
/// Direct-prompt strategies ask the model for the answer record itself;
/// fences are tolerated, everything else must be a JSON object with an
/// `answer` field.
pub fn parse_direct_answer(text: &str) -> StructuredAnswer {
    let trimmed = text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(mut object)) => match object.remove("answer") {
            Some(answer) => StructuredAnswer::Success {
                answer,
                columns_used: object
                    .remove("columns_used")
                    .and_then(|v| serde_json::from_value(v).ok())
                    .unwrap_or_default(),
                explanation: object
                    .remove("explanation")
                    .and_then(|v| match v {
                        serde_json::Value::String(s) => Some(s),
                        other => Some(other.to_string()),
                    })
                    .unwrap_or_default(),
            },
            None => StructuredAnswer::error("Response holds no `answer` field."),
        },
        Ok(_) => StructuredAnswer::error("Response is not a JSON object."),
        Err(err) => StructuredAnswer::error(format!("Failed to decode JSON response: {}", err)),
    }
}
