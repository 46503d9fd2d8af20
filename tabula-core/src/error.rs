use std::path::PathBuf;

use thiserror::Error;

use crate::analyzer::ParseError;
use crate::eval::EvalError;
use crate::preprocessor::ExtractError;
use crate::provider::types::ProviderError;
use crate::scoring::ScoringError;
use crate::table::registry::RegistryError;
use crate::tokenizer::token::TokenizeError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),
    #[error("Tokenize error: {0}")]
    Tokenize(#[from] TokenizeError),
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Eval error: {0}")]
    Eval(#[from] EvalError),
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, Error>;

impl Error {
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Error::Internal(message.into())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
