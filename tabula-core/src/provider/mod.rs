//! # Provider Component
//!
//! The model-completion collaborator. The core treats completion as an
//! opaque `prompt -> text` call behind the [`types::CompletionProvider`]
//! trait; this module supplies the OpenAI-backed implementation used in
//! production and a scripted one for tests.
//!
//! * [`types`]: Provider trait, completion record, and error taxonomy
//! * [`openai_chat`]: Chat-completion client over `async-openai`
//! * [`scripted`]: Canned completions for deterministic tests

pub mod openai_chat;
pub mod scripted;
pub mod types;

pub use openai_chat::OpenAiChatProvider;
pub use scripted::ScriptedProvider;
pub use types::{Completion, CompletionMetadata, CompletionProvider, ProviderError, ProviderResult};
