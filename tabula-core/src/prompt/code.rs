//! Code-generation prompt.
//!
//! Asks the model for a snippet-language function rather than an answer.
//! The language description enumerates exactly the builtin surface the
//! sandbox exposes; anything else the model invents fails at execution and
//! is reported as an error answer.

use async_trait::async_trait;

use super::{PromptStrategy, StrategyMode};
use crate::config::ProviderConfig;
use crate::error::CoreResult;
use crate::provider::CompletionProvider;
use crate::table::Table;

pub struct CodePrompt;

#[async_trait]
impl PromptStrategy for CodePrompt {
    fn name(&self) -> &str {
        "code"
    }

    fn mode(&self) -> StrategyMode {
        StrategyMode::Code
    }

    async fn build(
        &self,
        table: &Table,
        question: &str,
        _provider: &dyn CompletionProvider,
        _config: &ProviderConfig,
    ) -> CoreResult<String> {
        Ok(format!(
            r#"You are an AI assistant that generates code to answer questions based on a tabular dataset.

Below is the dataset as CSV (first row is the header):
```
{csv_data}
```

The dataset contains the following columns: {columns}

### Task:
Write a function called `answer(table)` in the small table language described below that computes the answer to the following question:
**Question:** {question}

The language:
- Statements: `let x = expr;`, `x = expr;`, `return expr;`, `if cond {{ ... }} else {{ ... }}`, `while cond {{ ... }}`. Every statement ends with `;`.
- `table["column"]` yields the column as a list. Numeric columns contain numbers, all other columns contain strings.
- Table methods: `table.rows()`, `table.columns()`, `table.where("column", "op", value)` where op is one of "==", "!=", ">", ">=", "<", "<=" for numeric columns and "==", "!=", "contains" for text columns.
- List methods: `count()`, `sum()`, `mean()`, `median()`, `min()`, `max()`, `unique()`, `sorted()`, `reversed()`, `first()`, `last()`, `argmax()`, `argmin()`, `contains(value)`, and `list[i]` for positional access.
- String methods: `lower()`, `upper()`, `len()`, `trim()`. Number methods: `abs()`, `round()`, `round(digits)`, `floor()`, `ceil()`, `sqrt()`.

The function must return a map in the following format:
```
{{
    answer: <your answer>,
    columns_used: ["<column1>", "<column2>"],
    explanation: "<brief reasoning>"
}}
```

Ensure:
- The function uses only the necessary columns.
- The answer is one of the following data types: String, Integer, Float, List of Strings, List of Integers, or List of Floats.

ONLY RETURN THE CODE, DO NOT RETURN ANYTHING ELSE."#,
            csv_data = table.to_csv_string(),
            columns = table.header().join(", "),
            question = question,
        ))
    }
}
