use serde::Serialize;
use sheetlab_engine::engine::{Cell, CellId, Value, propagate, recalculate_all};
use tracing::debug;

use super::{Document, ModeEvent};
use crate::activity::{ActionEntry, ActionKind, CellSnapshot};
use crate::error::Result;

/// Outcome of committing one edit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CommitReport {
    pub cell: CellId,
    pub value: Value,
    /// Other cells recomputed because of the edit, in evaluation order.
    pub affected: Vec<CellId>,
    /// Cells found on a reference cycle; all of them now hold `#ERR`.
    pub cycles: Vec<CellId>,
}

impl Document {
    /// Store `formula` in `cell` and bring every dependent up to date.
    ///
    /// Referenced cells that don't exist yet are created empty. Formula
    /// problems end up as `#ERR` values, so this only fails for a cell
    /// outside the grid.
    pub fn commit_edit(&mut self, cell: CellId, formula: &str) -> Result<CommitReport> {
        self.ensure_in_bounds(&cell)?;
        let before = CellSnapshot::of(self.cells.get(&cell));

        self.graph.update_references(cell, formula, &self.bounds);
        self.create_referenced_cells();
        self.cells
            .entry(cell)
            .or_insert_with(|| Cell::new_empty(cell))
            .formula = Some(formula.to_string());

        let propagation = propagate(&cell, &self.graph, &mut self.cells, &self.bounds);

        let mode_before = self.mode;
        self.mode = mode_before.on(ModeEvent::Commit).unwrap_or(mode_before);
        self.edit_buffer = None;

        let after = CellSnapshot::of(self.cells.get(&cell));
        let value = after.value.clone();
        self.log.push(
            ActionEntry::new(ActionKind::EditCommit)
                .cell(cell)
                .modes(mode_before, self.mode)
                .before(before)
                .after(after)
                .affected(&propagation.affected),
        );
        if !propagation.affected.is_empty() {
            self.log
                .push(ActionEntry::new(ActionKind::Recalc).affected(&propagation.affected));
        }
        debug!(cell = %cell, affected = propagation.affected.len(), "committed edit");

        Ok(CommitReport {
            cell,
            value,
            affected: propagation.affected,
            cycles: propagation.cycles,
        })
    }

    /// Commit the edit buffer to the selected cell. None when nothing is
    /// being edited.
    pub fn commit_buffer(&mut self) -> Option<Result<CommitReport>> {
        let text = self.edit_buffer.clone()?;
        Some(self.commit_edit(self.selected, &text))
    }

    /// Re-evaluate every cell from its formula. Returns the cells on cycles.
    /// Not logged: on a settled store this changes nothing.
    pub fn recalculate_all(&mut self) -> Vec<CellId> {
        recalculate_all(&self.graph, &mut self.cells, &self.bounds).cycles
    }
}
