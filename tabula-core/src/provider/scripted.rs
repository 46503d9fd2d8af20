//! Scripted provider for deterministic tests.
//!
//! Hands back a queue of canned completions in order, recording every prompt
//! it was asked. Exhausting the queue is an API error so a test that makes
//! one call too many fails loudly.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::types::{
    Completion, CompletionMetadata, CompletionProvider, ProviderError, ProviderResult,
};
use crate::config::ProviderConfig;

pub struct ScriptedProvider {
    name: String,
    completions: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(name: impl Into<String>, completions: Vec<String>) -> Self {
        Self {
            name: name.into(),
            completions: Mutex::new(completions.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn single(completion: impl Into<String>) -> Self {
        Self::new("scripted", vec![completion.into()])
    }

    /// Prompts seen so far, in call order.
    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt lock").clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(
        &self,
        prompt: &str,
        config: &ProviderConfig,
    ) -> ProviderResult<Completion> {
        self.prompts
            .lock()
            .expect("prompt lock")
            .push(prompt.to_string());
        let content = self
            .completions
            .lock()
            .expect("completion lock")
            .pop_front()
            .ok_or_else(|| ProviderError::Api("scripted completions exhausted".to_string()))?;
        Ok(Completion {
            content,
            metadata: CompletionMetadata {
                model: config.model.clone(),
                created_at: Utc::now(),
                token_usage: None,
                finish_reason: Some("stop".to_string()),
            },
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_scripted_completion_order() {
        let provider = ScriptedProvider::new("test", vec!["one".into(), "two".into()]);
        let config = ProviderConfig::default();
        assert_eq!(provider.complete("a", &config).await.unwrap().content, "one");
        assert_eq!(provider.complete("b", &config).await.unwrap().content, "two");
        assert!(provider.complete("c", &config).await.is_err());
        assert_eq!(provider.recorded_prompts(), vec!["a", "b", "c"]);
    }
}
