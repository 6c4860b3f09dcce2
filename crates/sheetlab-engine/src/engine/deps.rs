//! Dependency extraction from formula strings.
//!
//! Finds every cell a formula reads so the dependency graph can be kept in
//! step with the formula text. Handles:
//! - Simple cell references: `A1`, `b2`
//! - Range sums: `SUM(A1:B5)` contributes every cell in the rectangle
//!
//! Literal formulas (no leading `=`) reference nothing.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

use super::cell_ref::{CellId, GridBounds};
use super::eval::FORMULA_MARKER;

/// Extract all in-bounds cell references from a formula, deduplicated and
/// in row-major order.
pub fn extract_dependencies(formula: &str, bounds: &GridBounds) -> Vec<CellId> {
    let Some(body) = formula.strip_prefix(FORMULA_MARKER) else {
        return Vec::new();
    };
    let mut deps = BTreeSet::new();

    // Rectangle cells. Corners are taken literally, same as evaluation, so an
    // inverted range adds only its textual corners below.
    for caps in sum_range_re().captures_iter(body) {
        if let Some((start, end)) = parse_range(&caps[1], &caps[2], bounds) {
            for row in start.row..=end.row {
                for col in start.col..=end.col {
                    deps.insert(CellId::new(col, row));
                }
            }
        }
    }

    for caps in cell_ref_re().captures_iter(body) {
        if let Some(cell) = CellId::parse(&caps[0], bounds) {
            deps.insert(cell);
        }
    }

    deps.into_iter().collect()
}

fn parse_range(start: &str, end: &str, bounds: &GridBounds) -> Option<(CellId, CellId)> {
    Some((CellId::parse(start, bounds)?, CellId::parse(end, bounds)?))
}

fn cell_ref_re() -> &'static Regex {
    static CELL_RE: OnceLock<Regex> = OnceLock::new();
    CELL_RE.get_or_init(|| {
        Regex::new(r"\b[A-Za-z]+[0-9]+\b").expect("dependency cell reference regex must compile")
    })
}

fn sum_range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bSUM\s*\(\s*([A-Za-z]+[0-9]+)\s*:\s*([A-Za-z]+[0-9]+)\s*\)")
            .expect("range sum regex must compile")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(formula: &str) -> Vec<String> {
        extract_dependencies(formula, &GridBounds::default())
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    #[test]
    fn test_literals_have_no_dependencies() {
        assert!(names("A1").is_empty());
        assert!(names("see B2").is_empty());
        assert!(names("=10 + 20").is_empty());
    }

    #[test]
    fn test_deduplicates_and_orders() {
        assert_eq!(names("=b2 + A1 + a1"), vec!["A1", "B2"]);
    }

    #[test]
    fn test_sum_expands_rectangle() {
        assert_eq!(names("=SUM(A1:B2)"), vec!["A1", "B1", "A2", "B2"]);
        assert_eq!(names("=sum( A1 : A3 )+C1"), vec!["A1", "C1", "A2", "A3"]);
    }

    #[test]
    fn test_inverted_sum_keeps_textual_corners() {
        assert_eq!(names("=SUM(A3:A1)"), vec!["A1", "A3"]);
    }

    #[test]
    fn test_out_of_bounds_references_are_ignored() {
        assert_eq!(names("=Z1+A11+A1+SUM1"), vec!["A1"]);
    }
}
