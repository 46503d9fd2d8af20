//! # Prompt Component
//!
//! Prompt construction for each questioning strategy. A strategy renders the
//! dataset and question into the text sent to the completion provider; it
//! never executes anything itself. Strategies come in two modes:
//!
//! * `Code` — the completion is expected to hold a snippet definition and is
//!   routed through extraction and sandboxed execution ([`code`]).
//! * `Direct` — the completion is expected to hold the answer record itself
//!   and is parsed as JSON ([`zero_shot`], [`few_shot`], [`engineered`],
//!   [`chain_of_thought`]).
//!
//! Chain-of-thought is the one strategy that talks to the provider while
//! building its final prompt: a first completion nominates the relevant
//! columns, which are then woven into the reasoning prompt.

pub mod chain_of_thought;
pub mod code;
pub mod engineered;
pub mod few_shot;
pub mod zero_shot;

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::error::CoreResult;
use crate::provider::CompletionProvider;
use crate::table::Table;

pub use chain_of_thought::ChainOfThoughtPrompt;
pub use code::CodePrompt;
pub use engineered::EngineeredPrompt;
pub use few_shot::FewShotPrompt;
pub use zero_shot::ZeroShotPrompt;

/// How the pipeline should treat this strategy's completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyMode {
    /// Completion holds snippet source to extract and execute.
    Code,
    /// Completion holds the structured answer as JSON.
    Direct,
}

#[async_trait]
pub trait PromptStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn mode(&self) -> StrategyMode;

    /// Builds the final prompt for one (table, question) pair. The provider
    /// is available for strategies whose prompt depends on a preliminary
    /// completion; most implementations ignore it.
    async fn build(
        &self,
        table: &Table,
        question: &str,
        provider: &dyn CompletionProvider,
        config: &ProviderConfig,
    ) -> CoreResult<String>;
}

/// The JSON answer shape every direct strategy asks for.
pub(crate) const ANSWER_RECORD_EXAMPLE: &str = r#"{
    "answer": "<your answer>",
    "columns_used": ["<column1>", "<column2>"],
    "explanation": "<brief reasoning>"
}"#;
