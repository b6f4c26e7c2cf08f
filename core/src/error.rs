use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Column not found for field '{field}'. Aliases: {aliases:?}")]
    ColumnNotFound { field: String, aliases: Vec<String> },

    #[error("Duplicate column '{name}' in table header")]
    DuplicateColumn { name: String },

    #[error("Row {row} has {actual} cells, expected {expected}")]
    RowWidth { row: usize, expected: usize, actual: usize },

    #[error("Column '{name}' does not exist in this table")]
    UnknownColumn { name: String },

    #[error("Field '{name}' is not part of the resolved mapping")]
    UnknownField { name: String },

    #[error("Invalid schema: {reason}")]
    InvalidSchema { reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SchemaResult<T> = Result<T, SchemaError>;
