//! Formula evaluation.
//!
//! [`evaluate`] is total: every formula maps to a [`Value`], with
//! [`Value::Error`] standing in for anything that cannot be computed.
//! Literal formulas (no leading `=`) become numbers or text; `=` formulas go
//! through the [`parser`](super::parser) and are evaluated against the grid.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::trace;

use super::cell::{Grid, Value, numeric_value};
use super::cell_ref::{CellId, GridBounds};
use super::parser::{self, Expr, Op, ParseError};

/// Marks a formula as an expression rather than a literal.
pub const FORMULA_MARKER: char = '=';

/// Why a formula failed to produce a number.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EvalError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("division produced a non-finite value")]
    NonFiniteDivision,

    #[error("result is not a finite number")]
    NonFinite,
}

/// Evaluate `formula` against the current grid contents.
pub fn evaluate(formula: &str, grid: &Grid, bounds: &GridBounds) -> Value {
    let Some(body) = formula.strip_prefix(FORMULA_MARKER) else {
        return literal_value(formula);
    };

    match evaluate_expression(body, grid, bounds) {
        Ok(n) => Value::Number(n),
        Err(err) => {
            trace!(formula, error = %err, "formula evaluated to error");
            Value::Error
        }
    }
}

/// Evaluate the body of an `=` formula, reporting why it failed.
pub fn evaluate_expression(body: &str, grid: &Grid, bounds: &GridBounds) -> Result<f64, EvalError> {
    let expr = parser::parse(body, bounds)?;
    let n = eval_expr(&expr, grid)?;
    if n.is_finite() {
        Ok(n)
    } else {
        Err(EvalError::NonFinite)
    }
}

fn eval_expr(expr: &Expr, grid: &Grid) -> Result<f64, EvalError> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Ref(id) => Ok(numeric_value(grid, id)),
        Expr::Sum { start, end } => Ok(sum_range(grid, start, end)),
        Expr::Neg(inner) => Ok(-eval_expr(inner, grid)?),
        Expr::Binary { op, left, right } => {
            let l = eval_expr(left, grid)?;
            let r = eval_expr(right, grid)?;
            match op {
                Op::Add => Ok(l + r),
                Op::Sub => Ok(l - r),
                Op::Mul => Ok(l * r),
                Op::Div => {
                    let q = l / r;
                    if q.is_finite() {
                        Ok(q)
                    } else {
                        Err(EvalError::NonFiniteDivision)
                    }
                }
            }
        }
    }
}

/// Sum every cell with `start.row <= row <= end.row` and
/// `start.col <= col <= end.col`. Inverted corners give an empty range.
pub fn sum_range(grid: &Grid, start: &CellId, end: &CellId) -> f64 {
    let mut total = 0.0;
    for row in start.row..=end.row {
        for col in start.col..=end.col {
            total += numeric_value(grid, &CellId::new(col, row));
        }
    }
    total
}

/// Value of a formula without the `=` marker.
pub fn literal_value(text: &str) -> Value {
    if text.trim().is_empty() {
        Value::Empty
    } else if let Some(n) = parse_decimal(text) {
        Value::Number(n)
    } else {
        Value::Text(text.to_string())
    }
}

/// Parse text that is entirely a decimal number (surrounding whitespace
/// allowed). Exponents, `inf` and `NaN` are not decimals, and neither is a
/// digit string too long to fit in an `f64`.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if !decimal_re().is_match(trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn decimal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)$").expect("decimal regex must compile")
    })
}
