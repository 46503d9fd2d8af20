//! System configuration.
//!
//! Everything tunable lives here as serde types with per-field defaults, so
//! a partial JSON config file (or none at all) always yields a runnable
//! system.

use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path, path::PathBuf, time::Duration};

use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SystemConfig {
    /// Directory holding one sub-directory per dataset.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub table: TableConfig,

    #[serde(default)]
    pub executor: ExecutorConfig,

    #[serde(default)]
    pub provider: ProviderConfig,
}

impl SystemConfig {
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Fraction of parseable cells required for a column to become numeric.
    #[serde(default = "default_numeric_column_threshold")]
    pub numeric_column_threshold: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            numeric_column_threshold: default_numeric_column_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Evaluation steps a single snippet invocation may spend.
    #[serde(default = "default_max_fuel")]
    pub max_fuel: u64,

    /// Wall-clock bound per invocation.
    #[serde(default = "default_execution_timeout", with = "duration_ms")]
    pub timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_fuel: default_max_fuel(),
            timeout: default_execution_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Completion model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_numeric_column_threshold() -> f64 {
    crate::table::normalize::NUMERIC_COLUMN_THRESHOLD
}

fn default_max_fuel() -> u64 {
    1_000_000
}

fn default_execution_timeout() -> Duration {
    Duration::from_millis(2000)
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.0
}

fn default_max_tokens() -> usize {
    300
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = SystemConfig::default();
        assert_eq!(config.table.numeric_column_threshold, 0.8);
        assert_eq!(config.executor.max_fuel, 1_000_000);
        assert_eq!(config.executor.timeout, Duration::from_millis(2000));
        assert_eq!(config.provider.model, "gpt-4o-mini");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: SystemConfig =
            serde_json::from_str(r#"{"executor": {"max_fuel": 10}}"#).unwrap();
        assert_eq!(config.executor.max_fuel, 10);
        assert_eq!(config.executor.timeout, Duration::from_millis(2000));
        assert_eq!(config.table.numeric_column_threshold, 0.8);
    }

    #[test]
    fn test_duration_round_trip() {
        let config = SystemConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: SystemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.executor.timeout, config.executor.timeout);
    }

    #[test]
    fn test_from_missing_file() {
        let err = SystemConfig::from_file("/nope/config.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
