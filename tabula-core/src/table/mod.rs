//! # Table Component
//!
//! The table component holds the tabular datasets that questions are asked
//! about. Datasets are loaded from CSV directories into a [`registry`] and
//! handed to the snippet pipeline after column typing by [`normalize`].
//!
//! ## Component Structure
//!
//! * [`registry`]: Named dataset storage with `sample`/`full` variants
//! * [`normalize`]: Column type inference and missing-value imputation
//!
//! A [`Table`] is immutable once loaded and is shared across pipeline runs
//! behind an `Arc`; the normalizer always produces a fresh [`normalize::TypedTable`]
//! rather than mutating cells in place.

pub mod normalize;
pub mod registry;

use serde::{Deserialize, Serialize};

/// Which rendition of a dataset to operate on.
///
/// Every dataset directory carries a small `sample.csv` used for prompting
/// and a complete `all.csv` used for execution.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
    strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Sample,
    Full,
}

impl Variant {
    /// CSV file name backing this variant inside a dataset directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Variant::Sample => "sample.csv",
            Variant::Full => "all.csv",
        }
    }
}

/// An ordered grid of string cells with a header row.
///
/// The header names columns (unique within a table, not globally). Rows whose
/// width does not match the header are dropped at construction time, so every
/// surviving row indexes cleanly by column position.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(name: impl Into<String>, header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let header_len = header.len();
        let rows = rows.into_iter().filter(|r| r.len() == header_len).collect();
        Self {
            name: name.into(),
            header,
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    /// Renders the table back to CSV text (header first) for prompt
    /// inclusion, quoting only where needed.
    pub fn to_csv_string(&self) -> String {
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Necessary)
            .from_writer(Vec::new());
        // Writing records into a Vec cannot fail.
        let _ = writer.write_record(&self.header);
        for row in &self.rows {
            let _ = writer.write_record(row);
        }
        let bytes = writer.into_inner().unwrap_or_default();
        String::from_utf8_lossy(&bytes).trim_end().to_string()
    }
}
