//! Action log.
//!
//! A bounded, newest-first record of what the user and the engine did. It is
//! purely observational: inspector views read it, nothing replays it.
//! Serialized entries keep the field names the inspector view expects
//! (`type`, `modeBefore`, `affectedCells`, ...).

use rand::Rng;
use serde::{Serialize, Serializer};
use std::collections::VecDeque;

use sheetlab_engine::engine::{Cell, CellId, Value};

use crate::config::DEFAULT_LOG_CAPACITY;
use crate::document::Mode;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    Click,
    EditStart,
    EditCommit,
    ModeChange,
    Recalc,
}

/// A cell's formula and value at one moment.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CellSnapshot {
    pub formula: String,
    pub value: Value,
}

impl CellSnapshot {
    /// Snapshot of `cell`, or of an empty cell when it doesn't exist yet.
    pub fn of(cell: Option<&Cell>) -> CellSnapshot {
        match cell {
            Some(cell) => CellSnapshot {
                formula: cell.formula_text().to_string(),
                value: cell.value.clone(),
            },
            None => CellSnapshot {
                formula: String::new(),
                value: Value::Empty,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell: Option<CellId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_before: Option<Mode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_after: Option<Mode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<CellSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<CellSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected_cells: Option<Vec<CellId>>,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
}

impl ActionEntry {
    /// A fresh entry with a random id and the current time.
    pub fn new(kind: ActionKind) -> ActionEntry {
        ActionEntry {
            id: generate_id(),
            kind,
            cell: None,
            mode_before: None,
            mode_after: None,
            before: None,
            after: None,
            affected_cells: None,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn cell(mut self, cell: CellId) -> Self {
        self.cell = Some(cell);
        self
    }

    pub fn modes(mut self, before: Mode, after: Mode) -> Self {
        self.mode_before = Some(before);
        self.mode_after = Some(after);
        self
    }

    pub fn before(mut self, snapshot: CellSnapshot) -> Self {
        self.before = Some(snapshot);
        self
    }

    pub fn after(mut self, snapshot: CellSnapshot) -> Self {
        self.after = Some(snapshot);
        self
    }

    /// Record affected cells; an empty list leaves the field absent.
    pub fn affected(mut self, cells: &[CellId]) -> Self {
        self.affected_cells = (!cells.is_empty()).then(|| cells.to_vec());
        self
    }
}

fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Fixed-capacity ring buffer of [`ActionEntry`], newest first.
#[derive(Clone, Debug)]
pub struct ActionLog {
    entries: VecDeque<ActionEntry>,
    capacity: usize,
}

impl ActionLog {
    /// A log holding at most `capacity` entries (at least one). Storage
    /// grows as entries arrive.
    pub fn with_capacity(capacity: usize) -> ActionLog {
        let capacity = capacity.max(1);
        ActionLog {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_LOG_CAPACITY)),
            capacity,
        }
    }

    /// Append an entry, dropping the oldest one when full.
    pub fn push(&mut self, entry: ActionEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &ActionEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&ActionEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ActionLog {
    fn default() -> Self {
        ActionLog::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl Serialize for ActionLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter())
    }
}
