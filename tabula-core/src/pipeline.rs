//! Pipeline orchestration for one (dataset, question) pair.
//!
//! Fetch table → request code → extract → normalize → execute → serialize.
//! Registry lookup failures terminate the question with an error, since an
//! unknown dataset is a configuration fault. Every later failure — provider,
//! extraction, execution — is folded into a `StructuredAnswer { error }` so
//! a batch run survives any single question.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{ProviderConfig, SystemConfig, TableConfig};
use crate::error::CoreResult;
use crate::preprocessor::extract;
use crate::prompt::{PromptStrategy, StrategyMode};
use crate::provider::CompletionProvider;
use crate::sandbox::SandboxedExecutor;
use crate::serialize::{StructuredAnswer, parse_direct_answer, serialize};
use crate::table::normalize::normalize;
use crate::table::registry::TableRegistry;
use crate::table::Variant;

pub struct Pipeline {
    registry: Arc<TableRegistry>,
    provider: Arc<dyn CompletionProvider>,
    strategy: Arc<dyn PromptStrategy>,
    executor: SandboxedExecutor,
    table_config: TableConfig,
    provider_config: ProviderConfig,
}

impl Pipeline {
    pub fn new(
        registry: Arc<TableRegistry>,
        provider: Arc<dyn CompletionProvider>,
        strategy: Arc<dyn PromptStrategy>,
        config: &SystemConfig,
    ) -> Self {
        Self {
            registry,
            provider,
            strategy,
            executor: SandboxedExecutor::new(&config.executor),
            table_config: config.table.clone(),
            provider_config: config.provider.clone(),
        }
    }

    /// Runs the full pipeline for one question, emitting exactly one
    /// structured answer. A fresh execution scope is built per call; the
    /// only state shared across calls is the read-only registry.
    #[tracing::instrument(skip(self), fields(trace_id = %Uuid::new_v4()))]
    pub async fn run(
        &self,
        dataset: &str,
        variant: Variant,
        question: &str,
    ) -> CoreResult<StructuredAnswer> {
        let table = self.registry.get(dataset, variant)?;

        let prompt = match self
            .strategy
            .build(&table, question, self.provider.as_ref(), &self.provider_config)
            .await
        {
            Ok(prompt) => prompt,
            Err(err) => {
                warn!(error = %err, "prompt construction failed");
                return Ok(StructuredAnswer::error(format!(
                    "Error requesting completion: {}",
                    err
                )));
            }
        };

        let completion = match self
            .provider
            .complete(&prompt, &self.provider_config)
            .await
        {
            Ok(completion) => completion,
            Err(err) => {
                warn!(error = %err, provider = self.provider.name(), "completion failed");
                return Ok(StructuredAnswer::error(format!(
                    "Error requesting completion: {}",
                    err
                )));
            }
        };

        match self.strategy.mode() {
            StrategyMode::Direct => Ok(parse_direct_answer(&completion.content)),
            StrategyMode::Code => {
                let source = match extract(&completion.content) {
                    Ok(source) => source,
                    Err(err) => {
                        debug!(error = %err, "extraction failed");
                        return Ok(StructuredAnswer::error(
                            "Could not extract the function definition.",
                        ));
                    }
                };
                let typed = Arc::new(normalize(
                    &table,
                    self.table_config.numeric_column_threshold,
                ));
                let outcome = self.executor.execute(&source, typed);
                Ok(serialize(&outcome))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{CodePrompt, ZeroShotPrompt};
    use crate::provider::ScriptedProvider;
    use crate::table::Table;
    use crate::table::registry::RegistryError;
    use crate::error::Error;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn registry() -> Arc<TableRegistry> {
        let registry = TableRegistry::new();
        registry.insert(
            "cities",
            Variant::Sample,
            Table::new(
                "cities",
                vec!["age".into(), "city".into()],
                vec![
                    vec!["34".into(), "NY".into()],
                    vec!["".into(), "LA".into()],
                    vec!["29".into(), "NY".into()],
                ],
            ),
        );
        Arc::new(registry)
    }

    fn code_pipeline(completion: &str) -> Pipeline {
        Pipeline::new(
            registry(),
            Arc::new(ScriptedProvider::single(completion)),
            Arc::new(CodePrompt),
            &SystemConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_code_path_end_to_end() {
        let pipeline = code_pipeline(
            "```\nfn answer(table) {\n    return { answer: table[\"age\"].mean(), columns_used: [\"age\"] };\n}\n```",
        );
        let answer = pipeline
            .run("cities", Variant::Sample, "What is the mean age?")
            .await
            .unwrap();
        assert_eq!(
            serde_json::to_value(&answer).unwrap(),
            json!({"answer": 31.5, "columns_used": ["age"], "explanation": ""})
        );
    }

    #[tokio::test]
    async fn test_unknown_dataset_is_terminal() {
        let pipeline = code_pipeline("irrelevant");
        let err = pipeline
            .run("missing", Variant::Sample, "anything")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Registry(RegistryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_definition_becomes_error_answer() {
        let pipeline = code_pipeline("The answer is 42.");
        let answer = pipeline
            .run("cities", Variant::Sample, "anything")
            .await
            .unwrap();
        assert_eq!(
            answer,
            StructuredAnswer::error("Could not extract the function definition.")
        );
    }

    #[tokio::test]
    async fn test_runtime_failure_becomes_error_answer() {
        let pipeline =
            code_pipeline("fn answer(table) { return { answer: table[\"salary\"].mean() }; }");
        let answer = pipeline
            .run("cities", Variant::Sample, "anything")
            .await
            .unwrap();
        let StructuredAnswer::Error { error } = answer else {
            panic!("expected error answer");
        };
        assert!(error.starts_with("Error executing code:"));
    }

    #[tokio::test]
    async fn test_provider_failure_becomes_error_answer() {
        let pipeline = Pipeline::new(
            registry(),
            Arc::new(ScriptedProvider::new("empty", vec![])),
            Arc::new(CodePrompt),
            &SystemConfig::default(),
        );
        let answer = pipeline
            .run("cities", Variant::Sample, "anything")
            .await
            .unwrap();
        let StructuredAnswer::Error { error } = answer else {
            panic!("expected error answer");
        };
        assert!(error.starts_with("Error requesting completion:"));
    }

    #[tokio::test]
    async fn test_direct_mode_parses_completion() {
        let pipeline = Pipeline::new(
            registry(),
            Arc::new(ScriptedProvider::single(
                r#"{"answer": "NY", "columns_used": ["city"], "explanation": "Most frequent."}"#,
            )),
            Arc::new(ZeroShotPrompt),
            &SystemConfig::default(),
        );
        let answer = pipeline
            .run("cities", Variant::Sample, "Most common city?")
            .await
            .unwrap();
        assert_eq!(answer.answer_text(), "NY");
    }
}
