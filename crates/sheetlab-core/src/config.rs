//! Engine configuration.
//!
//! Deserializable so front ends can read it from a file; every field has a
//! default, so an empty document is a valid configuration.

use serde::Deserialize;
use sheetlab_engine::engine::{GridBounds, MAX_COLUMNS, MAX_ROWS};

use crate::error::{Result, SheetError};

/// Default number of entries kept in the action log.
pub const DEFAULT_LOG_CAPACITY: usize = 50;
/// Largest action log a config may ask for.
pub const MAX_LOG_CAPACITY: usize = 10_000;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Number of columns (A..).
    pub columns: usize,
    /// Number of rows (1..).
    pub rows: usize,
    pub log_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let bounds = GridBounds::default();
        EngineConfig {
            columns: bounds.columns,
            rows: bounds.rows,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Grid bounds described by this config, if they are expressible.
    pub fn bounds(&self) -> Result<GridBounds> {
        GridBounds::new(self.columns, self.rows).ok_or(SheetError::InvalidBounds {
            columns: self.columns,
            rows: self.rows,
            max_columns: MAX_COLUMNS,
            max_rows: MAX_ROWS,
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.bounds()?;
        if !(1..=MAX_LOG_CAPACITY).contains(&self.log_capacity) {
            return Err(SheetError::InvalidLogCapacity {
                capacity: self.log_capacity,
                max: MAX_LOG_CAPACITY,
            });
        }
        Ok(())
    }
}
