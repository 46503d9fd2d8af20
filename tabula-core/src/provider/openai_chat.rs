//! OpenAI chat-completion provider.

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
    },
};
use async_trait::async_trait;
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::types::{
    Completion, CompletionMetadata, CompletionProvider, ProviderError, ProviderResult,
};
use crate::config::ProviderConfig;

const SYSTEM_PROMPT: &str = "You are a data analyst answering questions about tabular data.";

pub struct OpenAiChatProvider {
    client: Client<OpenAIConfig>,
    name: String,
}

impl OpenAiChatProvider {
    pub fn new(name: impl Into<String>, api_key: &SecretString) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.expose_secret());
        Self {
            client: Client::with_config(config),
            name: name.into(),
        }
    }

    /// Reads `OPENAI_API_KEY` from the environment.
    pub fn from_env(name: impl Into<String>) -> ProviderResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ProviderError::Authentication("OPENAI_API_KEY is not set".to_string())
        })?;
        Ok(Self::new(name, &SecretString::from(api_key)))
    }

    #[tracing::instrument(skip(self, prompt, config))]
    async fn chat_completion(
        &self,
        prompt: &str,
        config: &ProviderConfig,
    ) -> ProviderResult<Completion> {
        debug!(prompt_len = prompt.len(), model = %config.model, "requesting completion");

        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(
                    SYSTEM_PROMPT.to_string(),
                ),
                name: None,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(prompt.to_string()),
                name: None,
            }),
        ];

        let request = CreateChatCompletionRequest {
            model: config.model.clone(),
            messages,
            temperature: Some(config.temperature),
            max_completion_tokens: Some(config.max_tokens as u32),
            ..Default::default()
        };

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| ProviderError::Api(e.to_string()))?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| ProviderError::Api("No response content".into()))?;

        Ok(Completion {
            content: content.trim().to_string(),
            metadata: CompletionMetadata {
                model: config.model.clone(),
                created_at: Utc::now(),
                token_usage: response
                    .usage
                    .map(|u| (u.prompt_tokens as usize, u.completion_tokens as usize)),
                finish_reason: response
                    .choices
                    .first()
                    .map(|c| format!("{:?}", c.finish_reason)),
            },
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiChatProvider {
    async fn complete(
        &self,
        prompt: &str,
        config: &ProviderConfig,
    ) -> ProviderResult<Completion> {
        self.chat_completion(prompt, config).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
