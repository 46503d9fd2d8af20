//! Column type inference and missing-value imputation.
//!
//! Generated snippets apply arithmetic to columns without per-cell type
//! checks, so every table is normalized before execution: columns that are
//! mostly numeric become fully numeric, and no empty cell survives in either
//! column kind. The typing decision is recomputed on every call; nothing is
//! cached across tables or questions.

use super::Table;

/// Fraction of a column's cells that must parse as numbers for the column to
/// be treated as numeric. The rate is computed over all rows, so empty cells
/// count against the threshold.
pub const NUMERIC_COLUMN_THRESHOLD: f64 = 0.8;

/// Cell storage for one typed column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedColumn {
    pub name: String,
    pub values: ColumnValues,
}

/// A table after column typing: numeric columns hold only numbers, textual
/// columns hold no missing markers.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedTable {
    name: String,
    columns: Vec<TypedColumn>,
    row_count: usize,
}

impl TypedTable {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[TypedColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&TypedColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// A typed table with the same columns restricted to the given row
    /// positions. Used by row-filtering operations inside the executor.
    pub fn select_rows(&self, indices: &[usize]) -> TypedTable {
        let columns = self
            .columns
            .iter()
            .map(|c| TypedColumn {
                name: c.name.clone(),
                values: match &c.values {
                    ColumnValues::Numeric(v) => {
                        ColumnValues::Numeric(indices.iter().map(|&i| v[i]).collect())
                    }
                    ColumnValues::Text(v) => {
                        ColumnValues::Text(indices.iter().map(|&i| v[i].clone()).collect())
                    }
                },
            })
            .collect();
        TypedTable {
            name: self.name.clone(),
            columns,
            row_count: indices.len(),
        }
    }
}

/// Median over the given values; 0.0 when no values are present. The input
/// contains only successfully parsed cells, never imputation placeholders.
fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn parse_cell(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Converts a raw string table into a [`TypedTable`].
///
/// A column becomes numeric when at least `threshold` of its cells (over all
/// rows) parse as finite numbers; its unparseable cells are imputed with the
/// median of the parsed ones. Textual columns keep their cells verbatim,
/// with empties as `""`. A zero-row table passes through with every column
/// textual and empty.
pub fn normalize(table: &Table, threshold: f64) -> TypedTable {
    let total = table.row_count();
    let columns = table
        .header()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<&str> = table.rows().iter().map(|r| r[idx].as_str()).collect();
            let parsed: Vec<Option<f64>> = cells.iter().map(|c| parse_cell(c)).collect();
            let numeric_count = parsed.iter().filter(|p| p.is_some()).count();

            let values = if total > 0 && (numeric_count as f64 / total as f64) >= threshold {
                let present: Vec<f64> = parsed.iter().filter_map(|p| *p).collect();
                let fill = median(&present);
                ColumnValues::Numeric(parsed.into_iter().map(|p| p.unwrap_or(fill)).collect())
            } else {
                ColumnValues::Text(cells.into_iter().map(|c| c.to_string()).collect())
            };
            TypedColumn {
                name: name.clone(),
                values,
            }
        })
        .collect();

    TypedTable {
        name: table.name().to_string(),
        columns,
        row_count: total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(rows: Vec<Vec<&str>>) -> Table {
        Table::new(
            "t",
            rows[0].iter().map(|s| s.to_string()).collect(),
            rows[1..]
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    /// Back to a string table, so normalization can be applied twice.
    fn untype(typed: &TypedTable) -> Table {
        let header = typed.column_names();
        let rows = (0..typed.row_count())
            .map(|i| {
                typed
                    .columns()
                    .iter()
                    .map(|c| match &c.values {
                        ColumnValues::Numeric(v) => v[i].to_string(),
                        ColumnValues::Text(v) => v[i].clone(),
                    })
                    .collect()
            })
            .collect();
        Table::new(typed.name(), header, rows)
    }

    #[test]
    fn test_numeric_column_imputes_median() {
        let table = raw(vec![
            vec!["age", "city"],
            vec!["34", "NY"],
            vec!["", "LA"],
            vec!["29", "NY"],
        ]);
        let typed = normalize(&table, NUMERIC_COLUMN_THRESHOLD);
        // Median of {34, 29} is 31.5; the placeholder never joins the median.
        assert_eq!(
            typed.column("age").unwrap().values,
            ColumnValues::Numeric(vec![34.0, 31.5, 29.0])
        );
        assert_eq!(
            typed.column("city").unwrap().values,
            ColumnValues::Text(vec!["NY".into(), "LA".into(), "NY".into()])
        );
    }

    #[test]
    fn test_below_threshold_stays_text() {
        let table = raw(vec![
            vec!["mixed"],
            vec!["1"],
            vec!["2"],
            vec!["three"],
            vec!["four"],
        ]);
        let typed = normalize(&table, 0.8);
        assert_eq!(
            typed.column("mixed").unwrap().values,
            ColumnValues::Text(vec!["1".into(), "2".into(), "three".into(), "four".into()])
        );
    }

    #[test]
    fn test_empty_cells_count_against_threshold() {
        // 3 of 5 parse: 60% < 80%, stays text even though every non-empty
        // cell is numeric.
        let table = raw(vec![
            vec!["v"],
            vec!["1"],
            vec!["2"],
            vec!["3"],
            vec![""],
            vec![""],
        ]);
        let typed = normalize(&table, 0.8);
        assert!(matches!(
            typed.column("v").unwrap().values,
            ColumnValues::Text(_)
        ));
    }

    #[test]
    fn test_all_empty_numeric_column_fills_zero() {
        let table = raw(vec![vec!["v"], vec![""], vec![""]]);
        // Threshold 0.0 forces the numeric path with nothing parsed.
        let typed = normalize(&table, 0.0);
        assert_eq!(
            typed.column("v").unwrap().values,
            ColumnValues::Numeric(vec![0.0, 0.0])
        );
    }

    #[test]
    fn test_zero_rows_short_circuits() {
        let table = raw(vec![vec!["a", "b"]]);
        let typed = normalize(&table, 0.8);
        assert_eq!(typed.row_count(), 0);
        assert_eq!(typed.column("a").unwrap().values, ColumnValues::Text(vec![]));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let table = raw(vec![
            vec!["age", "city"],
            vec!["34", "NY"],
            vec!["", "LA"],
            vec!["29", ""],
        ]);
        let once = normalize(&table, NUMERIC_COLUMN_THRESHOLD);
        let twice = normalize(&untype(&once), NUMERIC_COLUMN_THRESHOLD);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_select_rows() {
        let table = raw(vec![vec!["v"], vec!["1"], vec!["2"], vec!["3"]]);
        let typed = normalize(&table, 0.8);
        let subset = typed.select_rows(&[0, 2]);
        assert_eq!(subset.row_count(), 2);
        assert_eq!(
            subset.column("v").unwrap().values,
            ColumnValues::Numeric(vec![1.0, 3.0])
        );
    }
}
