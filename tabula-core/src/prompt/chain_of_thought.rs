//! Chain-of-thought prompting.
//!
//! Two phases: a first completion nominates the columns relevant to the
//! question, then the reasoning prompt names those columns and asks for a
//! step-by-step derivation. A malformed column response degrades to an empty
//! column list instead of failing the question.

use async_trait::async_trait;
use tracing::debug;

use super::{ANSWER_RECORD_EXAMPLE, PromptStrategy, StrategyMode};
use crate::config::ProviderConfig;
use crate::error::CoreResult;
use crate::provider::CompletionProvider;
use crate::table::Table;

pub struct ChainOfThoughtPrompt;

impl ChainOfThoughtPrompt {
    fn column_prompt(csv_data: &str, question: &str) -> String {
        format!(
            r#"You are analyzing a dataset and determining which columns are most relevant for answering a question.

Here is the dataset:
```
{csv_data}
```

Identify the column names that are necessary to answer this question:
"{question}"

Respond with a list of column names in JSON format:
{{
    "columns_used": ["<column1>", "<column2>"]
}}"#,
        )
    }

    fn parse_columns(content: &str) -> Vec<String> {
        let trimmed = content
            .trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim();
        serde_json::from_str::<serde_json::Value>(trimmed)
            .ok()
            .and_then(|v| {
                v.get("columns_used")
                    .cloned()
                    .and_then(|cols| serde_json::from_value(cols).ok())
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl PromptStrategy for ChainOfThoughtPrompt {
    fn name(&self) -> &str {
        "chain-of-thought"
    }

    fn mode(&self) -> StrategyMode {
        StrategyMode::Direct
    }

    async fn build(
        &self,
        table: &Table,
        question: &str,
        provider: &dyn CompletionProvider,
        config: &ProviderConfig,
    ) -> CoreResult<String> {
        let csv_data = table.to_csv_string();
        let column_completion = provider
            .complete(&Self::column_prompt(&csv_data, question), config)
            .await?;
        let relevant_columns = Self::parse_columns(&column_completion.content);
        debug!(columns = ?relevant_columns, "identified relevant columns");

        Ok(format!(
            r#"You are an AI answering questions based on tabular data.

Here is the dataset:
```
{csv_data}
```

The most relevant columns for answering the question are: {columns}.

Step 1: First, analyze the values in these columns and explain how they can be used to answer the question.

Step 2: Based on this analysis, derive the final answer.

Now, answer the question:
"{question}"
Make sure the answer you provide is simple and either of the following data-type:
- String
- Integer
- Float
- List of strings
- List of integers
- List of floats

Example response:
{example}"#,
            csv_data = csv_data,
            columns = relevant_columns.join(", "),
            question = question,
            example = ANSWER_RECORD_EXAMPLE,
        ))
    }
}
