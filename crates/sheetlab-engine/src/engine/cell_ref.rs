//! Cell identifier parsing and formatting.
//!
//! Identifiers are a single column letter followed by a 1-based row number
//! (e.g. "A1", "H10"). Both dimensions are bounded by [`GridBounds`], so the
//! same text can be valid on one grid and out of range on another.
//!
//! # Examples
//!
//! ```
//! use sheetlab_engine::engine::{CellId, GridBounds};
//!
//! let cell = CellId::parse("b3", &GridBounds::default()).unwrap();
//! assert_eq!(cell.col, 1); // 0-indexed
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

/// Largest number of columns a grid may have (A..=Z).
pub const MAX_COLUMNS: usize = 26;
/// Largest number of rows a grid may have (two-digit row numbers).
pub const MAX_ROWS: usize = 99;

/// Size of the addressable grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridBounds {
    pub columns: usize,
    pub rows: usize,
}

impl GridBounds {
    /// Create bounds, rejecting sizes the identifier grammar cannot express.
    pub fn new(columns: usize, rows: usize) -> Option<GridBounds> {
        if (1..=MAX_COLUMNS).contains(&columns) && (1..=MAX_ROWS).contains(&rows) {
            Some(GridBounds { columns, rows })
        } else {
            None
        }
    }

    pub fn contains(&self, cell: &CellId) -> bool {
        cell.col < self.columns && cell.row < self.rows
    }

    /// Last column letter, e.g. 'H' for the default grid.
    pub fn last_column(&self) -> char {
        CellId::col_to_letter(self.columns - 1)
    }

    /// Every cell in the grid, row-major.
    pub fn cells(&self) -> impl Iterator<Item = CellId> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.columns).map(move |col| CellId::new(col, row)))
    }
}

impl Default for GridBounds {
    /// Columns A..=H, rows 1..=10.
    fn default() -> Self {
        GridBounds {
            columns: 8,
            rows: 10,
        }
    }
}

/// A reference to a cell by column and row indices (0-indexed).
///
/// Ordering is row-major so sorted collections read like a spreadsheet.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct CellId {
    pub row: usize,
    pub col: usize,
}

impl CellId {
    pub fn new(col: usize, row: usize) -> CellId {
        CellId { row, col }
    }

    /// Parse an identifier in spreadsheet notation, case-insensitively.
    /// Returns None if the text is malformed or outside `bounds`.
    pub fn parse(name: &str, bounds: &GridBounds) -> Option<CellId> {
        let caps = cell_id_re().captures(name)?;
        let letter = caps["letter"].to_ascii_uppercase().bytes().next()?;
        let col = (letter - b'A') as usize;
        let row = caps["number"].parse::<usize>().ok()?.checked_sub(1)?;

        let cell = CellId::new(col, row);
        bounds.contains(&cell).then_some(cell)
    }

    /// Convert a column index to its letter (0 -> A, 7 -> H).
    pub fn col_to_letter(col: usize) -> char {
        (b'A' + (col % MAX_COLUMNS) as u8) as char
    }

    /// The cell `dcol` columns and `drow` rows away, clamped to the grid on
    /// each axis independently.
    pub fn moved(&self, dcol: i32, drow: i32, bounds: &GridBounds) -> CellId {
        let clamp = |from: usize, delta: i32, len: usize| {
            (from as i64 + delta as i64).clamp(0, len as i64 - 1) as usize
        };
        CellId::new(
            clamp(self.col, dcol, bounds.columns),
            clamp(self.row, drow, bounds.rows),
        )
    }
}

fn cell_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?<letter>[A-Za-z])(?<number>[1-9][0-9]?)$")
            .expect("cell identifier regex must compile")
    })
}

impl std::str::FromStr for CellId {
    type Err = String;

    /// Parses against the default grid bounds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, &GridBounds::default()).ok_or_else(|| format!("Invalid cell reference: {}", s))
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellId::col_to_letter(self.col), self.row + 1)
    }
}

impl Serialize for CellId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_leading_zero_and_multi_letter() {
        let bounds = GridBounds::default();
        assert!(CellId::parse("A01", &bounds).is_none());
        assert!(CellId::parse("AA1", &bounds).is_none());
        assert!(CellId::parse("A100", &bounds).is_none());
    }

    #[test]
    fn test_parse_respects_bounds() {
        let bounds = GridBounds::default();
        assert_eq!(CellId::parse("H10", &bounds), Some(CellId::new(7, 9)));
        assert!(CellId::parse("I1", &bounds).is_none());
        assert!(CellId::parse("A11", &bounds).is_none());

        let wide = GridBounds::new(26, 99).unwrap();
        assert_eq!(CellId::parse("z99", &wide), Some(CellId::new(25, 98)));
    }

    #[test]
    fn test_bounds_validation() {
        assert!(GridBounds::new(0, 10).is_none());
        assert!(GridBounds::new(27, 10).is_none());
        assert!(GridBounds::new(8, 100).is_none());
        assert_eq!(GridBounds::default().last_column(), 'H');
    }

    #[test]
    fn test_moved_clamps_each_axis() {
        let bounds = GridBounds::default();
        let a1 = CellId::new(0, 0);
        assert_eq!(a1.moved(-1, 0, &bounds), a1);
        assert_eq!(a1.moved(1, 1, &bounds), CellId::new(1, 1));
        assert_eq!(a1.moved(-3, 4, &bounds), CellId::new(0, 4));
        assert_eq!(CellId::new(7, 9).moved(5, 1, &bounds), CellId::new(7, 9));
    }

    #[test]
    fn test_row_major_ordering() {
        let mut cells = vec![CellId::new(0, 1), CellId::new(1, 0), CellId::new(0, 0)];
        cells.sort();
        let names: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
        assert_eq!(names, vec!["A1", "B1", "A2"]);
    }

    #[test]
    fn test_serializes_as_canonical_string() {
        let json = serde_json::to_string(&CellId::new(2, 4)).unwrap();
        assert_eq!(json, "\"C5\"");
    }
}
