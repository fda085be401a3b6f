//! Error types for tablekit-core

use crate::table::ColumnType;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tablekit-core
#[derive(Debug, Error)]
pub enum Error {
    /// A type row label that names no known column type
    #[error("unknown column type '{label}' (expected int, float or string)")]
    UnknownColumnType { label: String },

    /// A column type with no defined string coercion
    #[error("no string coercion defined for column type {ty}")]
    UnsupportedType { ty: ColumnType },

    /// A numeric field that failed to parse under the strict coercion policy
    #[error("cannot convert '{value}' to {ty}")]
    Coercion { value: String, ty: ColumnType },

    /// The document ended before a required leading row
    #[error("CSV document has no {section} row")]
    MissingSection { section: &'static str },

    /// Column names must be unique within a table
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    /// A column is already registered at this CSV position
    #[error("column position {position} is already taken by '{existing}'")]
    PositionOccupied { position: usize, existing: String },

    /// A row or edit referenced a column the table does not declare
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// A value whose type differs from its column's declared type
    #[error("column '{column}' is declared {expected} but got a {found} value")]
    TypeMismatch {
        column: String,
        expected: ColumnType,
        found: ColumnType,
    },

    /// Row index past the end of the table
    #[error("row {index} out of range (table has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    /// Column index past the end of an asset row
    #[error("column {index} out of range (table has {len} columns)")]
    ColumnOutOfRange { index: usize, len: usize },

    /// An asset row carries more values than there are columns
    #[error("row {row} has {values} values but only {columns} columns are declared")]
    RowWidth {
        row: usize,
        values: usize,
        columns: usize,
    },

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV writer error from the csv crate
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
