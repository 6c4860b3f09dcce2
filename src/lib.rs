//! sheetlab - command-mode driver for the Sheetlab engine.

pub mod command;
pub mod config;
pub mod error;

pub use command::{Command, execute, run_script};
pub use config::{load_config, load_grid};
pub use error::{CommandError, Result};
