//! Cell data structures for the spreadsheet grid.
//!
//! - [`Value`] - The computed result held by a cell (empty, number, text, or error)
//! - [`Cell`] - A cell with its raw formula, computed value, and display string
//! - [`Grid`] - Sparse, ordered storage for cells

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use super::cell_ref::CellId;
use super::format::format_number;

/// Display and serialized spelling of [`Value::Error`].
pub const ERROR_SENTINEL: &str = "#ERR";

/// The computed value of a cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    /// The formula could not be computed.
    Error,
}

impl Value {
    /// Numeric reading used when another formula references this value.
    /// Anything that is not a number (or number-like text) reads as 0.
    pub fn as_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Text(s) => super::eval::parse_decimal(s).unwrap_or(0.0),
            Value::Empty | Value::Error => 0.0,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Text(s) => f.write_str(s),
            Value::Error => f.write_str(ERROR_SENTINEL),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Empty => serializer.serialize_none(),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Error => serializer.serialize_str(ERROR_SENTINEL),
        }
    }
}

/// A cell in the spreadsheet grid.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Cell {
    pub id: CellId,
    /// Raw user text. `None` until the cell is assigned a formula.
    pub formula: Option<String>,
    pub value: Value,
    pub display: String,
}

impl Cell {
    /// A cell that exists only because something referenced it.
    pub fn new_empty(id: CellId) -> Cell {
        Cell {
            id,
            formula: None,
            value: Value::Empty,
            display: String::new(),
        }
    }

    /// A cell holding `formula`, not yet evaluated.
    pub fn with_formula(id: CellId, formula: &str) -> Cell {
        Cell {
            formula: Some(formula.to_string()),
            ..Cell::new_empty(id)
        }
    }

    /// Store a freshly computed value and keep `display` in step with it.
    pub fn set_value(&mut self, value: Value) {
        self.display = value.to_string();
        self.value = value;
    }

    /// The formula text, or "" for a cell that never had one.
    pub fn formula_text(&self) -> &str {
        self.formula.as_deref().unwrap_or("")
    }
}

/// Sparse grid storage, ordered row-major.
pub type Grid = BTreeMap<CellId, Cell>;

/// Numeric value of `id` in `grid`; missing cells read as 0.
pub fn numeric_value(grid: &Grid, id: &CellId) -> f64 {
    grid.get(id).map(|cell| cell.value.as_number()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_follows_value() {
        let mut cell = Cell::with_formula(CellId::new(0, 0), "=1/0");
        cell.set_value(Value::Error);
        assert_eq!(cell.display, "#ERR");
        cell.set_value(Value::Number(2.5));
        assert_eq!(cell.display, "2.5");
        cell.set_value(Value::Empty);
        assert_eq!(cell.display, "");
    }

    #[test]
    fn test_as_number_fallbacks() {
        assert_eq!(Value::Number(3.0).as_number(), 3.0);
        assert_eq!(Value::Text(" 4.5 ".into()).as_number(), 4.5);
        assert_eq!(Value::Text("abc".into()).as_number(), 0.0);
        assert_eq!(Value::Text(ERROR_SENTINEL.into()).as_number(), 0.0);
        assert_eq!(Value::Error.as_number(), 0.0);
        assert_eq!(Value::Empty.as_number(), 0.0);
    }

    #[test]
    fn test_value_json_shape() {
        assert_eq!(serde_json::to_string(&Value::Empty).unwrap(), "null");
        assert_eq!(serde_json::to_string(&Value::Number(10.0)).unwrap(), "10.0");
        assert_eq!(serde_json::to_string(&Value::Error).unwrap(), "\"#ERR\"");
    }
}
