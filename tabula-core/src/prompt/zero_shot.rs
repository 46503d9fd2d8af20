//! Zero-shot baseline: the dataset and the question, nothing else.

use async_trait::async_trait;

use super::{ANSWER_RECORD_EXAMPLE, PromptStrategy, StrategyMode};
use crate::config::ProviderConfig;
use crate::error::CoreResult;
use crate::provider::CompletionProvider;
use crate::table::Table;

pub struct ZeroShotPrompt;

#[async_trait]
impl PromptStrategy for ZeroShotPrompt {
    fn name(&self) -> &str {
        "zero-shot"
    }

    fn mode(&self) -> StrategyMode {
        StrategyMode::Direct
    }

    async fn build(
        &self,
        table: &Table,
        question: &str,
        _provider: &dyn CompletionProvider,
        _config: &ProviderConfig,
    ) -> CoreResult<String> {
        Ok(format!(
            r#"You are an AI answering questions based on tabular data.

Here is the dataset:
```
{csv_data}
```

Answer the following question directly, without explanation:
{question}

Example response:
{example}"#,
            csv_data = table.to_csv_string(),
            question = question,
            example = ANSWER_RECORD_EXAMPLE,
        ))
    }
}
