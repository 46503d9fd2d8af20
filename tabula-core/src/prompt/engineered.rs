//! Prompt-engineered variant: strict output formatting rules ahead of the
//! question.

use async_trait::async_trait;

use super::{ANSWER_RECORD_EXAMPLE, PromptStrategy, StrategyMode};
use crate::config::ProviderConfig;
use crate::error::CoreResult;
use crate::provider::CompletionProvider;
use crate::table::Table;

pub struct EngineeredPrompt;

#[async_trait]
impl PromptStrategy for EngineeredPrompt {
    fn name(&self) -> &str {
        "engineered"
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
            r#"Please read these instructions carefully:
1. Provide ONLY the answer without any explanations or units
2. Format your response following these rules:
    - For boolean questions: respond with ONLY 'True' or 'False'
    - For numeric answers: provide ONLY the number in strings (e.g., '42', '3.14')
    - For text answers: provide ONLY the exact text
    - For float answers: do not round the number, use the exact float value
    - For list answers: use exact list format (e.g., [1, 2, 3] or ['a', 'b', 'c'])
3. Do not include:
    - Units (e.g., write '42' not '42 kg')
    - Explanations or reasoning
    - Additional context
    - Quotation marks around text answers
    - Formatting or line breaks
    - Currency symbols

Here is the dataset:
```
{csv_data}
```

Question: {question}

Answer in JSON format:

Example response:
{example}"#,
            csv_data = table.to_csv_string(),
            question = question,
            example = ANSWER_RECORD_EXAMPLE,
        ))
    }
}
