//! Dataset registry: named tables with `sample` and `full` variants.
//!
//! Loaded once from a directory tree (one sub-directory per dataset, each
//! holding `sample.csv` and `all.csv`) and treated as read-only afterwards.
//! The registry is shared behind an `Arc` across concurrent pipeline runs;
//! lookups hand out `Arc<Table>` clones.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tracing::{debug, warn};

use super::{Table, Variant};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Dataset {dataset}/{variant} not found")]
    NotFound { dataset: String, variant: Variant },
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid CSV in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug, Default)]
struct DatasetTables {
    sample: Option<Arc<Table>>,
    full: Option<Arc<Table>>,
}

/// Holds every loaded dataset. No mutation beyond initial load; `insert` is
/// the injection point for pre-built tables in tests.
#[derive(Debug, Default)]
pub struct TableRegistry {
    datasets: DashMap<String, DatasetTables>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every dataset sub-directory under `dir`. Files that are absent
    /// are skipped; unreadable files fail the load.
    pub fn load_dir(dir: impl AsRef<Path>) -> RegistryResult<Self> {
        let dir = dir.as_ref();
        let registry = Self::new();
        let entries = std::fs::read_dir(dir).map_err(|source| RegistryError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| RegistryError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            if !entry.path().is_dir() {
                continue;
            }
            let dataset = entry.file_name().to_string_lossy().to_string();
            for variant in [Variant::Sample, Variant::Full] {
                let csv_path = entry.path().join(variant.file_name());
                if !csv_path.exists() {
                    continue;
                }
                let table = read_csv_table(&csv_path, &dataset)?;
                debug!(
                    dataset = %dataset,
                    variant = %variant,
                    rows = table.row_count(),
                    "loaded table"
                );
                registry.insert(&dataset, variant, table);
            }
            if !registry.datasets.contains_key(&dataset) {
                warn!(dataset = %dataset, "dataset directory holds no CSV variants");
            }
        }
        Ok(registry)
    }

    pub fn insert(&self, dataset: &str, variant: Variant, table: Table) {
        let mut entry = self.datasets.entry(dataset.to_string()).or_default();
        let slot = Arc::new(table);
        match variant {
            Variant::Sample => entry.sample = Some(slot),
            Variant::Full => entry.full = Some(slot),
        }
    }

    pub fn get(&self, dataset: &str, variant: Variant) -> RegistryResult<Arc<Table>> {
        let not_found = || RegistryError::NotFound {
            dataset: dataset.to_string(),
            variant,
        };
        let entry = self.datasets.get(dataset).ok_or_else(not_found)?;
        let table = match variant {
            Variant::Sample => entry.sample.as_ref(),
            Variant::Full => entry.full.as_ref(),
        };
        table.cloned().ok_or_else(not_found)
    }

    pub fn dataset_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.datasets.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

fn read_csv_table(path: &Path, dataset: &str) -> RegistryResult<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| RegistryError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| RegistryError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        records.push(record.iter().map(|c| c.to_string()).collect::<Vec<_>>());
    }
    let header = if records.is_empty() {
        Vec::new()
    } else {
        records.remove(0)
    };
    Ok(Table::new(dataset, header, records))
}
