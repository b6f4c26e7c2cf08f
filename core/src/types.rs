//! Shared primitive types used across the engine.

/// Name of a logical field in the caller's schema ("Corretora", "Data Fecho").
pub type FieldName = String;

/// Name of a real column as it appears in a table header.
pub type ColumnName = String;

/// Zero-based row position in a table.
pub type RowIndex = usize;
