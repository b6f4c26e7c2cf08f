//! Open-position drill-down over a classified table.
//!
//! Two levels, both taken from the open subset only:
//!   group (broker) → item (client) → positions
//! Values are compared after trimming; blank values never form a group or item.

use crate::{
    classify::{classify_with_summary, open_rows, ClassificationSummary, RecordStatus},
    config::SchemaConfig,
    error::SchemaResult,
    resolver::ResolvedMapping,
    table::{CellValue, Table},
    types::RowIndex,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One open row projected onto the output fields, keyed by display label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub row:   RowIndex,
    pub cells: Vec<(String, CellValue)>,
}

impl Position {
    pub fn get(&self, label: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(l, _)| l == label).map(|(_, v)| v)
    }
}

pub struct OpenBook<'t> {
    table:     &'t Table,
    statuses:  Vec<RecordStatus>,
    summary:   ClassificationSummary,
    open:      Vec<RowIndex>,
    group_idx: usize,
    item_idx:  usize,
    /// (display label, column index) in output order.
    outputs:   Vec<(String, usize)>,
}

impl<'t> OpenBook<'t> {
    /// Classify `table` and index its open rows for drill-down.
    pub fn build(
        table: &'t Table,
        mapping: &ResolvedMapping,
        config: &SchemaConfig,
    ) -> SchemaResult<Self> {
        let closing = mapping.column(&config.closing_field)?;
        let (statuses, summary) = classify_with_summary(table, closing, &config.policy)?;
        let open = open_rows(&statuses);

        let group_idx = table.column_index(mapping.column(&config.group_field)?)?;
        let item_idx = table.column_index(mapping.column(&config.item_field)?)?;

        let mut outputs = Vec::with_capacity(config.output_fields.len());
        for field in &config.output_fields {
            match mapping.get(field) {
                Some(resolved) => outputs.push((
                    resolved.label.clone(),
                    table.column_index(&resolved.resolution.column)?,
                )),
                None => log::debug!("output field '{field}' unresolved; leaving it out"),
            }
        }

        log::info!("{} of {} rows open", open.len(), statuses.len());
        Ok(Self {
            table,
            statuses,
            summary,
            open,
            group_idx,
            item_idx,
            outputs,
        })
    }

    pub fn statuses(&self) -> &[RecordStatus] {
        &self.statuses
    }

    /// Rule and status counts from the classification pass.
    pub fn summary(&self) -> &ClassificationSummary {
        &self.summary
    }

    pub fn open_rows(&self) -> &[RowIndex] {
        &self.open
    }

    fn value(&self, row: RowIndex, idx: usize) -> Option<String> {
        self.table.rows()[row][idx].trimmed()
    }

    /// Every open group with its sorted, distinct items.
    pub fn groups(&self) -> BTreeMap<String, Vec<String>> {
        let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for &row in &self.open {
            let Some(group) = self.value(row, self.group_idx) else {
                continue;
            };
            let items = groups.entry(group).or_default();
            if let Some(item) = self.value(row, self.item_idx) {
                items.insert(item);
            }
        }
        groups
            .into_iter()
            .map(|(group, items)| (group, items.into_iter().collect()))
            .collect()
    }

    /// Sorted distinct group values among open rows.
    pub fn group_values(&self) -> Vec<String> {
        self.open
            .iter()
            .filter_map(|&row| self.value(row, self.group_idx))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted distinct items among open rows of `group`.
    pub fn items_for(&self, group: &str) -> Vec<String> {
        let group = group.trim();
        self.open
            .iter()
            .filter(|&&row| self.value(row, self.group_idx).as_deref() == Some(group))
            .filter_map(|&row| self.value(row, self.item_idx))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Open rows of (`group`, `item`) projected onto the output fields.
    pub fn positions(&self, group: &str, item: &str) -> Vec<Position> {
        let (group, item) = (group.trim(), item.trim());
        self.open
            .iter()
            .filter(|&&row| {
                self.value(row, self.group_idx).as_deref() == Some(group)
                    && self.value(row, self.item_idx).as_deref() == Some(item)
            })
            .map(|&row| Position {
                row,
                cells: self
                    .outputs
                    .iter()
                    .map(|(label, idx)| (label.clone(), self.table.rows()[row][*idx].clone()))
                    .collect(),
            })
            .collect()
    }
}
