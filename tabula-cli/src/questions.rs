//! Question and answer-key file loading.
//!
//! A question file is a CSV with `question` and `dataset` columns. Gold
//! answers and their semantic types are plain text files, one entry per
//! line, aligned with the question file by position.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use tabula_core::scoring::Semantic;

#[derive(Debug, Error)]
pub enum QuestionFileError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid CSV in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("{path}: {source}")]
    Semantic {
        path: PathBuf,
        source: tabula_core::scoring::ScoringError,
    },
}

pub type QuestionFileResult<T> = Result<T, QuestionFileError>;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct QuestionRow {
    pub question: String,
    pub dataset: String,
}

pub fn load_questions(path: impl AsRef<Path>) -> QuestionFileResult<Vec<QuestionRow>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path).map_err(|source| QuestionFileError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    reader
        .deserialize()
        .map(|row| {
            row.map_err(|source| QuestionFileError::Csv {
                path: path.to_path_buf(),
                source,
            })
        })
        .collect()
}

pub fn load_lines(path: impl AsRef<Path>) -> QuestionFileResult<Vec<String>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| QuestionFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(content.lines().map(|line| line.to_string()).collect())
}

pub fn load_semantics(path: impl AsRef<Path>) -> QuestionFileResult<Vec<Semantic>> {
    let path = path.as_ref();
    load_lines(path)?
        .iter()
        .map(|line| {
            Semantic::parse(line).map_err(|source| QuestionFileError::Semantic {
                path: path.to_path_buf(),
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_load_questions() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "question,dataset").unwrap();
        writeln!(file, "What is the mean age?,071_COL").unwrap();
        writeln!(file, "\"How many, in total?\",072_BIK").unwrap();
        let rows = load_questions(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].dataset, "071_COL");
        assert_eq!(rows[1].question, "How many, in total?");
    }

    #[test]
    fn test_load_semantics() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "boolean\nnumber\nlist[category]").unwrap();
        let semantics = load_semantics(file.path()).unwrap();
        assert_eq!(
            semantics,
            vec![Semantic::Boolean, Semantic::Number, Semantic::ListCategory]
        );
    }

    #[test]
    fn test_unknown_semantic_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "boolean\nvector").unwrap();
        assert!(load_semantics(file.path()).is_err());
    }
}
