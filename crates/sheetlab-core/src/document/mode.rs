//! Selection and the Ready/Edit mode machine.
//!
//! | From  | Event          | To    |
//! |-------|----------------|-------|
//! | Ready | select(other)  | Ready |
//! | Ready | enter edit     | Edit  |
//! | Edit  | commit, cancel | Ready |
//! | Edit  | select(any)    | Ready |
//!
//! Anything else is a no-op. Selecting away from an edit abandons it.

use serde::Serialize;
use sheetlab_engine::engine::CellId;

use super::Document;
use crate::activity::{ActionEntry, ActionKind, CellSnapshot};
use crate::error::Result;

/// Whether the selected cell is being typed into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Mode {
    #[default]
    Ready,
    Edit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeEvent {
    Select { same_cell: bool },
    EnterEdit,
    Commit,
    Cancel,
}

impl Mode {
    /// Next mode after `event`, or None when the event does nothing here.
    pub fn on(self, event: ModeEvent) -> Option<Mode> {
        match (self, event) {
            (Mode::Ready, ModeEvent::Select { same_cell: true }) => None,
            (Mode::Ready, ModeEvent::Select { same_cell: false }) => Some(Mode::Ready),
            (Mode::Ready, ModeEvent::EnterEdit) => Some(Mode::Edit),
            (Mode::Ready, ModeEvent::Commit) => Some(Mode::Ready),
            (Mode::Ready, ModeEvent::Cancel) => None,
            (Mode::Edit, ModeEvent::Select { .. }) => Some(Mode::Ready),
            (Mode::Edit, ModeEvent::EnterEdit) => None,
            (Mode::Edit, ModeEvent::Commit | ModeEvent::Cancel) => Some(Mode::Ready),
        }
    }
}

impl Document {
    /// Move the selection to `cell`. Leaving an edit this way discards the
    /// edit buffer and is logged as a mode change.
    pub fn select_cell(&mut self, cell: CellId) -> Result<()> {
        self.ensure_in_bounds(&cell)?;
        let before = self.mode;
        let event = ModeEvent::Select {
            same_cell: cell == self.selected,
        };
        let Some(after) = before.on(event) else {
            return Ok(());
        };

        let previous = std::mem::replace(&mut self.selected, cell);
        self.mode = after;
        if before != after {
            self.edit_buffer = None;
            self.log.push(
                ActionEntry::new(ActionKind::ModeChange)
                    .cell(previous)
                    .modes(before, after),
            );
        }
        Ok(())
    }

    /// A click on `cell`: logged, then treated as a selection.
    pub fn record_click(&mut self, cell: CellId) -> Result<()> {
        self.ensure_in_bounds(&cell)?;
        self.log.push(ActionEntry::new(ActionKind::Click).cell(cell));
        self.select_cell(cell)
    }

    /// Select the neighbour `dcol` columns and `drow` rows away, stopping at
    /// the grid edges.
    pub fn move_selection(&mut self, dcol: i32, drow: i32) -> Result<CellId> {
        let target = self.selected.moved(dcol, drow, &self.bounds);
        self.select_cell(target)?;
        Ok(target)
    }

    /// Start editing the selected cell. The edit buffer starts out holding
    /// the cell's current formula.
    pub fn enter_edit_mode(&mut self) {
        let before = self.mode;
        let Some(after) = before.on(ModeEvent::EnterEdit) else {
            return;
        };
        self.mode = after;

        let current = self.cells.get(&self.selected);
        let snapshot = CellSnapshot::of(current);
        self.edit_buffer = Some(snapshot.formula.clone());
        self.log.push(
            ActionEntry::new(ActionKind::EditStart)
                .cell(self.selected)
                .modes(before, after)
                .before(snapshot),
        );
    }

    /// Replace the edit buffer. Typing while Ready starts an edit first.
    pub fn set_edit_buffer(&mut self, text: &str) {
        self.enter_edit_mode();
        self.edit_buffer = Some(text.to_string());
    }

    /// Abandon the current edit without touching any cell.
    pub fn cancel_edit(&mut self) {
        let before = self.mode;
        let Some(after) = before.on(ModeEvent::Cancel) else {
            return;
        };
        self.mode = after;
        self.edit_buffer = None;
        self.log.push(
            ActionEntry::new(ActionKind::ModeChange)
                .cell(self.selected)
                .modes(before, after),
        );
    }
}
