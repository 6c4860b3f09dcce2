//! Error types for Sheetlab core.
//!
//! Formula problems never show up here; they are stored in cells as `#ERR`.
//! These errors cover the edges: text that should name a cell but doesn't,
//! and configuration that can't describe a grid.

use thiserror::Error;

/// Errors that can occur in the Sheetlab document layer
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SheetError {
    #[error("Invalid cell reference: {0}")]
    InvalidCellRef(String),

    #[error("Cell at column {col}, row {row} is outside the grid")]
    OutOfBounds { col: usize, row: usize },

    #[error("Grid must have 1-{max_columns} columns and 1-{max_rows} rows (got {columns}x{rows})")]
    InvalidBounds {
        columns: usize,
        rows: usize,
        max_columns: usize,
        max_rows: usize,
    },

    #[error("Action log capacity must be between 1 and {max} (got {capacity})")]
    InvalidLogCapacity { capacity: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, SheetError>;
