//! sheetlab-core - UI-agnostic document model: the cell store, selection and
//! edit modes, the commit pipeline, and the action log.

pub mod activity;
pub mod config;
pub mod document;
pub mod error;

pub use activity::{ActionEntry, ActionKind, ActionLog, CellSnapshot};
pub use config::EngineConfig;
pub use document::{CommitReport, Document, Mismatch, Mode};
pub use error::{Result, SheetError};

pub use sheetlab_engine::engine::{Cell, CellId, GridBounds, Value};
