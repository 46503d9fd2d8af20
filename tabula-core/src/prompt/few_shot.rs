//! In-context learning: the zero-shot prompt plus worked examples and an
//! answer-type constraint.

use async_trait::async_trait;

use super::{ANSWER_RECORD_EXAMPLE, PromptStrategy, StrategyMode};
use crate::config::ProviderConfig;
use crate::error::CoreResult;
use crate::provider::CompletionProvider;
use crate::table::Table;

const WORKED_EXAMPLES: &str = r#"Example 1:
Dataset columns: name, score
Question: What is the highest score?
Response:
{
    "answer": 97,
    "columns_used": ["score"],
    "explanation": "The maximum value in the score column is 97."
}

Example 2:
Dataset columns: city, population
Question: Which cities have a population above one million?
Response:
{
    "answer": ["Madrid", "Barcelona"],
    "columns_used": ["city", "population"],
    "explanation": "Only these rows have population greater than 1000000."
}"#;

pub struct FewShotPrompt;

#[async_trait]
impl PromptStrategy for FewShotPrompt {
    fn name(&self) -> &str {
        "few-shot"
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

{examples}

Here is the dataset:
```
{csv_data}
```
Please answer the following question in JSON format:
Question: {question}
Make sure the answer you provide is simple and either of the following data-type:
- String
- Integer
- Float
- List of strings
- List of integers
- List of floats

Example response:
{example}"#,
            examples = WORKED_EXAMPLES,
            csv_data = table.to_csv_string(),
            question = question,
            example = ANSWER_RECORD_EXAMPLE,
        ))
    }
}
