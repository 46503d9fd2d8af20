//! # TABULA: Tabular Question Answering over Generated Programs
//!
//! Tabula answers natural-language questions about tabular datasets by
//! asking a language model for either a direct answer or a short program in
//! a restricted table language, then executing that program in a sandbox and
//! reconciling the result into a structured, comparable answer.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Raw completion → Preprocessor → Tokenizer → Analyzer → Evaluator
//! ```
//!
//! ### Stage 1: Extraction
//!
//! The [`preprocessor`] strips markdown artifacts from the raw model output
//! and isolates the single `fn answer(table)` definition the snippet
//! contract expects.
//!
//! ### Stage 2: Tokenization
//!
//! The [`tokenizer`] turns snippet source into a position-tagged token
//! stream.
//!
//! ### Stage 3: Parsing
//!
//! The [`analyzer`] builds the [`ast`] — one function definition with
//! statements and expressions — by recursive descent.
//!
//! ### Stage 4: Evaluation
//!
//! The [`eval`] module walks the AST against a normalized table under a fuel
//! budget and wall-clock deadline; the [`sandbox`] wraps it so that any
//! fault on any input becomes a reportable failure, never a crash.
//!
//! ## Supporting Components
//!
//! * [`table`]: Dataset registry, column typing, and missing-value
//!   imputation
//! * [`provider`]: The model-completion collaborator (OpenAI or scripted)
//! * [`prompt`]: Prompting strategies (code, zero-shot, few-shot,
//!   chain-of-thought, prompt-engineered)
//! * [`serialize`]: Canonical structured answers crossing the outward
//!   boundary
//! * [`pipeline`]: Orchestration of one (dataset, question) pair
//! * [`scoring`]: Semantic-typed comparison against gold answers and
//!   per-dataset accuracy breakdowns

pub mod analyzer;
pub mod ast;
pub mod config;
pub mod error;
pub mod eval;
pub mod pipeline;
pub mod preprocessor;
pub mod prompt;
pub mod provider;
pub mod sandbox;
pub mod scoring;
pub mod serialize;
pub mod table;
pub mod tokenizer;

// Re-exports
pub use config::SystemConfig;
pub use error::{CoreResult, Error};
pub use pipeline::Pipeline;
pub use sandbox::{ExecutionOutcome, SandboxedExecutor};
pub use serialize::StructuredAnswer;
pub use table::registry::TableRegistry;
pub use table::{Table, Variant};

#[cfg(test)]
mod tests {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    #[ctor::ctor]
    fn init_tests() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}
