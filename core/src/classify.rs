//! Record classifier — open vs closed from the closing-field cell.
//!
//! The export mixes three meanings in one column: an explicit zero (not yet
//! closed), a blank that upstream serialisation may have turned into a
//! placeholder string, and anything else (a closing date or amount).
//!
//! RULE ORDER, evaluated on the trimmed cell text:
//!   1. Locale-normalized text parses as zero          → NumericZero
//!   2. Text is one of the literal zero spellings      → ZeroLiteral
//!   3. Text is one of the blank markers               → BlankMarker
//!   4. Anything else                                  → Other
//!
//! Zero tags are always Open, Other is always Closed, BlankMarker follows
//! `ClassificationPolicy::treat_blank_as_open`. Classification never fails.

use crate::{
    error::SchemaResult,
    table::{CellValue, Table},
    types::RowIndex,
};
use serde::{Deserialize, Serialize};

pub const ZERO_LITERALS: [&str; 5] = ["0", "0,0", "0,00", "0.0", "0.00"];

pub const BLANK_MARKERS: [&str; 4] = ["", "nan", "None", "NaT"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationPolicy {
    #[serde(default = "default_true")]
    pub treat_blank_as_open: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self { treat_blank_as_open: true }
    }
}

impl ClassificationPolicy {
    /// Blank closing fields count as closed.
    pub fn conservative() -> Self {
        Self { treat_blank_as_open: false }
    }
}

/// Which rule a closing-field cell fell under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosingValue {
    NumericZero,
    ZeroLiteral,
    BlankMarker,
    Other,
}

/// Parse text written with period thousands and comma decimals
/// ("1.234,50" → 1234.5). `None` when the result is not a number.
pub fn locale_number(text: &str) -> Option<f64> {
    text.trim()
        .replace('.', "")
        .replace(',', ".")
        .parse::<f64>()
        .ok()
}

pub fn interpret(cell: &CellValue) -> ClosingValue {
    match cell {
        CellValue::Number(n) if n.is_nan() => ClosingValue::BlankMarker,
        CellValue::Number(n) if *n == 0.0 => ClosingValue::NumericZero,
        CellValue::Number(_) => ClosingValue::Other,
        CellValue::Blank => ClosingValue::BlankMarker,
        CellValue::Text(raw) => {
            let text = raw.trim();
            if locale_number(text) == Some(0.0) {
                ClosingValue::NumericZero
            } else if ZERO_LITERALS.contains(&text) {
                ClosingValue::ZeroLiteral
            } else if BLANK_MARKERS.contains(&text) {
                ClosingValue::BlankMarker
            } else {
                ClosingValue::Other
            }
        }
    }
}

pub fn status_for(value: ClosingValue, policy: &ClassificationPolicy) -> RecordStatus {
    match value {
        ClosingValue::NumericZero | ClosingValue::ZeroLiteral => RecordStatus::Open,
        ClosingValue::BlankMarker if policy.treat_blank_as_open => RecordStatus::Open,
        ClosingValue::BlankMarker | ClosingValue::Other => RecordStatus::Closed,
    }
}

pub fn classify(cell: &CellValue, policy: &ClassificationPolicy) -> RecordStatus {
    status_for(interpret(cell), policy)
}

/// Classify every row by its `column` cell, in row order.
pub fn classify_column(
    table: &Table,
    column: &str,
    policy: &ClassificationPolicy,
) -> SchemaResult<Vec<RecordStatus>> {
    Ok(table
        .column_values(column)?
        .into_iter()
        .map(|cell| classify(cell, policy))
        .collect())
}

pub fn open_rows(statuses: &[RecordStatus]) -> Vec<RowIndex> {
    statuses
        .iter()
        .enumerate()
        .filter(|(_, s)| **s == RecordStatus::Open)
        .map(|(i, _)| i)
        .collect()
}

/// Row counts per rule and per status for one classification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationSummary {
    pub rows:         usize,
    pub open:         usize,
    pub closed:       usize,
    pub numeric_zero: usize,
    pub zero_literal: usize,
    pub blank:        usize,
    pub other:        usize,
}

impl ClassificationSummary {
    pub fn record(&mut self, value: ClosingValue, status: RecordStatus) {
        self.rows += 1;
        match value {
            ClosingValue::NumericZero => self.numeric_zero += 1,
            ClosingValue::ZeroLiteral => self.zero_literal += 1,
            ClosingValue::BlankMarker => self.blank += 1,
            ClosingValue::Other => self.other += 1,
        }
        match status {
            RecordStatus::Open => self.open += 1,
            RecordStatus::Closed => self.closed += 1,
        }
    }
}

/// Classify every row of `column` and count the rules in the same pass.
pub fn classify_with_summary(
    table: &Table,
    column: &str,
    policy: &ClassificationPolicy,
) -> SchemaResult<(Vec<RecordStatus>, ClassificationSummary)> {
    let cells = table.column_values(column)?;
    let mut statuses = Vec::with_capacity(cells.len());
    let mut summary = ClassificationSummary::default();
    for cell in cells {
        let value = interpret(cell);
        let status = status_for(value, policy);
        summary.record(value, status);
        statuses.push(status);
    }
    log::info!(
        "classified {} rows on '{column}': {} open, {} closed ({} blank)",
        summary.rows,
        summary.open,
        summary.closed,
        summary.blank
    );
    Ok((statuses, summary))
}
