//! Error types for the Sheetlab driver

use sheetlab_core::SheetError;
use thiserror::Error;

/// Errors that can occur while running driver commands
#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("{command} requires {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("Not a number: {0}")]
    InvalidNumber(String),

    #[error("Expected <cell>=<value>, got: {0}")]
    InvalidExpectation(String),

    #[error("Nothing to commit: not in edit mode")]
    NotEditing,

    #[error("Expectation failed: {0}")]
    ExpectationFailed(String),

    #[error("Failed to parse {path}: {message}")]
    Grid { path: String, message: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("line {line}")]
    Line {
        line: usize,
        #[source]
        source: Box<CommandError>,
    },
}

pub type Result<T> = std::result::Result<T, CommandError>;
