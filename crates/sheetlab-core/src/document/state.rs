use sheetlab_engine::engine::{Cell, CellId, DependencyGraph, Grid, GridBounds, recalculate_all};
use tracing::debug;

use super::Mode;
use crate::activity::ActionLog;
use crate::config::EngineConfig;
use crate::error::{Result, SheetError};

/// UI-agnostic spreadsheet state.
///
/// Owns the cell store, the dependency graph and the action log outright;
/// they change only through `Document` operations, and each operation runs
/// to completion before returning.
#[derive(Debug)]
pub struct Document {
    /// Cell store, the single source of truth for formulas and values.
    pub(crate) cells: Grid,
    /// Reverse dependency map: cell -> cells that depend on it (and back).
    pub(crate) graph: DependencyGraph,
    pub(crate) bounds: GridBounds,
    pub(crate) selected: CellId,
    pub(crate) mode: Mode,
    /// Text typed into the selected cell but not yet committed.
    pub(crate) edit_buffer: Option<String>,
    pub(crate) log: ActionLog,
}

impl Document {
    /// Create an empty document with `A1` selected.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Document {
            cells: Grid::new(),
            graph: DependencyGraph::new(),
            bounds: config.bounds()?,
            selected: CellId::new(0, 0),
            mode: Mode::Ready,
            edit_buffer: None,
            log: ActionLog::with_capacity(config.log_capacity),
        })
    }

    /// Create a document pre-filled with raw formulas, fully evaluated.
    ///
    /// Seeding is not an edit: nothing is logged.
    pub fn with_cells<'a>(
        config: &EngineConfig,
        cells: impl IntoIterator<Item = (CellId, &'a str)>,
    ) -> Result<Self> {
        let mut doc = Self::new(config)?;
        for (cell, formula) in cells {
            doc.ensure_in_bounds(&cell)?;
            doc.graph.update_references(cell, formula, &doc.bounds);
            doc.cells.insert(cell, Cell::with_formula(cell, formula));
        }
        doc.create_referenced_cells();
        let result = recalculate_all(&doc.graph, &mut doc.cells, &doc.bounds);
        debug!(cells = doc.cells.len(), cycles = result.cycles.len(), "seeded document");
        Ok(doc)
    }

    /// Parse a cell identifier against this document's grid.
    pub fn parse_cell(&self, name: &str) -> Result<CellId> {
        CellId::parse(name.trim(), &self.bounds).ok_or_else(|| SheetError::InvalidCellRef(name.to_string()))
    }

    pub(crate) fn ensure_in_bounds(&self, cell: &CellId) -> Result<()> {
        if self.bounds.contains(cell) {
            Ok(())
        } else {
            Err(SheetError::OutOfBounds {
                col: cell.col,
                row: cell.row,
            })
        }
    }

    /// Materialise every cell some formula references, so the store holds
    /// (empty) entries for all precedents.
    pub(crate) fn create_referenced_cells(&mut self) {
        let referenced: Vec<CellId> = self
            .cells
            .keys()
            .flat_map(|cell| self.graph.precedents(cell))
            .collect();
        for cell in referenced {
            self.cells.entry(cell).or_insert_with(|| Cell::new_empty(cell));
        }
    }

    /// Every cell that exists, row-major.
    pub fn cells(&self) -> &Grid {
        &self.cells
    }

    pub fn cell(&self, cell: &CellId) -> Option<&Cell> {
        self.cells.get(cell)
    }

    /// Display string of a cell; "" for cells that don't exist.
    pub fn display(&self, cell: &CellId) -> &str {
        self.cells.get(cell).map(|c| c.display.as_str()).unwrap_or("")
    }

    /// Cells whose formulas reference `cell` directly.
    pub fn dependents(&self, cell: &CellId) -> Vec<CellId> {
        self.graph.dependents(cell).collect()
    }

    /// Cells referenced directly by `cell`'s formula.
    pub fn precedents(&self, cell: &CellId) -> Vec<CellId> {
        self.graph.precedents(cell).collect()
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selected(&self) -> CellId {
        self.selected
    }

    pub fn edit_buffer(&self) -> Option<&str> {
        self.edit_buffer.as_deref()
    }

    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }
}

impl Default for Document {
    fn default() -> Self {
        Document {
            cells: Grid::new(),
            graph: DependencyGraph::new(),
            bounds: GridBounds::default(),
            selected: CellId::new(0, 0),
            mode: Mode::Ready,
            edit_buffer: None,
            log: ActionLog::default(),
        }
    }
}
