use serde::Serialize;
use sheetlab_engine::engine::{CellId, Value};

use super::Document;

const NUMBER_TOLERANCE: f64 = 1e-9;

/// A cell whose value differs from what was expected.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Mismatch {
    pub cell: CellId,
    pub expected: Value,
    pub actual: Value,
}

impl Document {
    /// Compare current values against `expected`, returning every cell that
    /// differs. Cells that don't exist compare as empty.
    pub fn check_expected(&self, expected: &[(CellId, Value)]) -> Vec<Mismatch> {
        expected
            .iter()
            .filter_map(|(cell, want)| {
                let actual = self.cells.get(cell).map(|c| c.value.clone()).unwrap_or_default();
                (!values_match(want, &actual)).then(|| Mismatch {
                    cell: *cell,
                    expected: want.clone(),
                    actual,
                })
            })
            .collect()
    }
}

fn values_match(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(a), Value::Number(b)) => (a - b).abs() <= NUMBER_TOLERANCE,
        _ => expected == actual,
    }
}
