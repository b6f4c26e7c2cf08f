//! In-memory table handed to the engine by the dataset source.
//!
//! RULE: a Table is immutable once built. Column names are unique exactly as
//! provided (case and whitespace sensitive). Every row has one cell per column.

use crate::{
    error::{SchemaError, SchemaResult},
    types::{ColumnName, RowIndex},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A single untyped spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Blank,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// The cell as the export shows it once coerced to a string.
    /// Blank is `""`, NaN is `"nan"`, whole numbers drop the fraction.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Blank => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) if n.is_nan() => "nan".to_string(),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            CellValue::Number(n) => n.to_string(),
        }
    }

    /// Trimmed display text, or `None` for blank cells and blank text.
    pub fn trimmed(&self) -> Option<String> {
        match self {
            CellValue::Blank => None,
            CellValue::Number(n) if n.is_nan() => None,
            other => {
                let text = other.as_text();
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<ColumnName>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Build a table, enforcing unique column names and rectangular rows.
    pub fn new(columns: Vec<ColumnName>, rows: Vec<Vec<CellValue>>) -> SchemaResult<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::DuplicateColumn { name: name.clone() });
            }
        }
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != columns.len() {
                return Err(SchemaError::RowWidth {
                    row,
                    expected: columns.len(),
                    actual: cells.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn headers(&self) -> &[ColumnName] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> SchemaResult<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| SchemaError::UnknownColumn { name: name.to_string() })
    }

    pub fn cell(&self, row: RowIndex, column: &str) -> SchemaResult<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows
            .get(row)
            .map(|cells| &cells[idx])
            .ok_or_else(|| {
                SchemaError::Other(anyhow::anyhow!(
                    "row {row} out of range ({} rows)",
                    self.rows.len()
                ))
            })
    }

    /// Every cell of `column`, in row order.
    pub fn column_values(&self, column: &str) -> SchemaResult<Vec<&CellValue>> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(|cells| &cells[idx]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<ColumnName> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rejects_duplicate_columns() {
        let err = Table::new(cols(&["A", "B", "A"]), vec![]).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateColumn { ref name } if name == "A"));
    }

    #[test]
    fn columns_are_case_and_space_sensitive() {
        assert!(Table::new(cols(&["A", "a", "A "]), vec![]).is_ok());
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = Table::new(cols(&["A", "B"]), vec![vec!["x".into()]]).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::RowWidth { row: 0, expected: 2, actual: 1 }
        ));
    }

    #[test]
    fn cell_lookup_by_column_name() {
        let table = Table::new(
            cols(&["A", "B"]),
            vec![vec!["x".into(), CellValue::Number(2.0)]],
        )
        .unwrap();
        assert_eq!(table.cell(0, "B").unwrap(), &CellValue::Number(2.0));
        assert!(matches!(
            table.cell(0, "C"),
            Err(SchemaError::UnknownColumn { .. })
        ));
        assert!(table.cell(3, "A").is_err());
    }

    #[test]
    fn text_rendering_matches_export_coercion() {
        assert_eq!(CellValue::Blank.as_text(), "");
        assert_eq!(CellValue::Number(0.0).as_text(), "0");
        assert_eq!(CellValue::Number(1500.0).as_text(), "1500");
        assert_eq!(CellValue::Number(2.5).as_text(), "2.5");
        assert_eq!(CellValue::Number(f64::NAN).as_text(), "nan");
        assert_eq!(CellValue::text(" X ").trimmed().as_deref(), Some("X"));
        assert_eq!(CellValue::text("   ").trimmed(), None);
        assert_eq!(CellValue::Blank.trimmed(), None);
    }

    #[test]
    fn json_cells_deserialize_untagged() {
        let cells: Vec<CellValue> = serde_json::from_str(r#"[1.5, "abc", null]"#).unwrap();
        assert_eq!(
            cells,
            vec![CellValue::Number(1.5), CellValue::text("abc"), CellValue::Blank]
        );
    }
}
