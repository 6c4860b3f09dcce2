//! Spreadsheet engine API.
//!
//! This module provides the computation side of the spreadsheet:
//!
//! - [`Cell`], [`Value`], [`Grid`] - Data structures for cell storage
//! - [`CellId`], [`GridBounds`] - Cell identifier parsing within a bounded grid
//! - [`evaluate`] - Total formula evaluation (errors become `#ERR`)
//! - [`extract_dependencies`] - Parse formula dependencies
//! - [`DependencyGraph`] - Precedent/dependent edges between cells
//! - [`detect_cycle`] - Circular dependency detection
//! - [`propagate`], [`recalculate_all`] - Ordered recalculation
//! - [`format_number`] - Format values for display

mod cell;
mod cell_ref;
mod cycle;
mod deps;
mod eval;
mod format;
mod graph;
pub mod parser;
mod recalc;

pub use cell::{Cell, ERROR_SENTINEL, Grid, Value, numeric_value};
pub use cell_ref::{CellId, GridBounds, MAX_COLUMNS, MAX_ROWS};
pub use cycle::{cycle_members, detect_cycle, is_on_cycle};
pub use deps::extract_dependencies;
pub use eval::{EvalError, FORMULA_MARKER, evaluate, evaluate_expression, literal_value, parse_decimal, sum_range};
pub use format::format_number;
pub use graph::DependencyGraph;
pub use parser::{Expr, Op, ParseError, parse as parse_formula};
pub use recalc::{Propagation, Schedule, propagate, recalculate_all, schedule};
