//! CSV dataset source: turns a spreadsheet export on disk into a `Table`.
//!
//! Rows above the 1-based header row are skipped. Header cells are made
//! unique the way spreadsheet tooling does it ("Unnamed: 4", "Venda.1").

use anyhow::{anyhow, bail, Result};
use opsheet_core::table::{CellValue, Table};
use std::collections::HashSet;

pub fn load_csv(path: &str, header_row: usize) -> Result<Table> {
    if header_row == 0 {
        bail!("header row is 1-based; got 0");
    }
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| anyhow!("Cannot open {path}: {e}"))?;
    let table = read_table(reader, header_row).map_err(|e| anyhow!("{path}: {e}"))?;
    log::info!(
        "loaded {path}: {} columns, {} rows (header row {header_row})",
        table.headers().len(),
        table.row_count()
    );
    Ok(table)
}

pub fn read_table<R: std::io::Read>(mut reader: csv::Reader<R>, header_row: usize) -> Result<Table> {
    let mut records = reader.records();
    for _ in 1..header_row {
        records.next().transpose()?;
    }
    let header = records
        .next()
        .transpose()?
        .ok_or_else(|| anyhow!("no header found at row {header_row}"))?;
    let columns = unique_columns(header.iter());

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        let mut cells: Vec<CellValue> = record.iter().take(columns.len()).map(parse_cell).collect();
        cells.resize(columns.len(), CellValue::Blank);
        rows.push(cells);
    }
    Ok(Table::new(columns, rows)?)
}

fn parse_cell(raw: &str) -> CellValue {
    if raw.trim().is_empty() {
        CellValue::Blank
    } else {
        CellValue::text(raw)
    }
}

fn unique_columns<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for (idx, name) in names.enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {idx}")
        } else {
            name.to_string()
        };
        let mut candidate = base.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        seen.insert(candidate.clone());
        columns.push(candidate);
    }
    columns
}
