//! Dependency graph between cells.
//!
//! ```text
//! A → B  means  "B depends on A"  (A is a precedent of B)
//! ```
//!
//! Both directions are stored so "what breaks if I change X?" and "what does
//! X read?" are single lookups.
//!
//! # Invariants
//!
//! 1. `B ∈ dependents[A]` iff `A ∈ precedents[B]`.
//! 2. Empty sets are removed, not stored.
//! 3. [`DependencyGraph::replace_edges`] is the only mutator, and it rewrites
//!    every edge sourced from a formula in one step.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::cell_ref::{CellId, GridBounds};
use super::deps::extract_dependencies;

#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    /// Formula cell -> the cells it reads.
    precedents: BTreeMap<CellId, BTreeSet<CellId>>,
    /// Referenced cell -> the formula cells reading it.
    dependents: BTreeMap<CellId, BTreeSet<CellId>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-register `cell` against the references in its new formula.
    pub fn update_references(&mut self, cell: CellId, formula: &str, bounds: &GridBounds) {
        let refs = extract_dependencies(formula, bounds);
        self.replace_edges(cell, refs);
    }

    /// Drop every edge into `cell` and add one from each of `new_precedents`.
    pub fn replace_edges(&mut self, cell: CellId, new_precedents: impl IntoIterator<Item = CellId>) {
        if let Some(old) = self.precedents.remove(&cell) {
            for precedent in old {
                if let Some(set) = self.dependents.get_mut(&precedent) {
                    set.remove(&cell);
                    if set.is_empty() {
                        self.dependents.remove(&precedent);
                    }
                }
            }
        }

        let new_precedents: BTreeSet<CellId> = new_precedents.into_iter().collect();
        if new_precedents.is_empty() {
            return;
        }
        for precedent in &new_precedents {
            self.dependents.entry(*precedent).or_default().insert(cell);
        }
        self.precedents.insert(cell, new_precedents);
    }

    /// Cells whose formula references `cell` directly.
    pub fn dependents(&self, cell: &CellId) -> impl Iterator<Item = CellId> + '_ {
        self.dependents.get(cell).into_iter().flat_map(|s| s.iter().copied())
    }

    /// Cells referenced directly by `cell`'s formula.
    pub fn precedents(&self, cell: &CellId) -> impl Iterator<Item = CellId> + '_ {
        self.precedents.get(cell).into_iter().flat_map(|s| s.iter().copied())
    }

    /// `origin` plus every cell that transitively depends on it.
    pub fn reachable_from(&self, origin: &CellId) -> BTreeSet<CellId> {
        let mut seen = BTreeSet::from([*origin]);
        let mut queue = VecDeque::from([*origin]);
        while let Some(current) = queue.pop_front() {
            for dep in self.dependents(&current) {
                if seen.insert(dep) {
                    queue.push_back(dep);
                }
            }
        }
        seen
    }

    /// Number of precedent → dependent edges.
    pub fn edge_count(&self) -> usize {
        self.precedents.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.precedents.is_empty()
    }
}
