use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::ProviderConfig;

/// A model completion service: one prompt in, one raw text out.
///
/// The returned text is untrusted free-form output; everything downstream of
/// this trait must tolerate malformed content.
#[async_trait]
#[mockall::automock]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str, config: &ProviderConfig)
    -> ProviderResult<Completion>;

    fn name(&self) -> &str;
}

#[derive(Debug, Default, Clone)]
pub struct Completion {
    pub content: String,
    pub metadata: CompletionMetadata,
}

#[derive(Debug, Clone)]
pub struct CompletionMetadata {
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub token_usage: Option<TokenUsage>,
    pub finish_reason: Option<String>,
}

impl Default for CompletionMetadata {
    fn default() -> Self {
        Self {
            model: String::new(),
            created_at: Utc::now(),
            token_usage: None,
            finish_reason: None,
        }
    }
}

/// (prompt tokens, completion tokens)
pub type TokenUsage = (usize, usize);

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;
