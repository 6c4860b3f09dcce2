//! Circular dependency detection for formula cells.
//!
//! A cell is on a cycle when following its precedents leads back to it
//! (A1 references B1, B1 references C1, C1 references A1; or simply A1
//! references A1). The search is iterative so long reference chains cannot
//! exhaust the stack.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::cell_ref::CellId;
use super::graph::DependencyGraph;

/// Detect a circular dependency through `start`.
///
/// Returns the shortest closed path `start → … → start`, following
/// precedent edges, or None when `start` is not on a cycle.
pub fn detect_cycle(start: &CellId, graph: &DependencyGraph) -> Option<Vec<CellId>> {
    // Breadth-first over precedents, remembering how each cell was reached.
    let mut came_from: BTreeMap<CellId, CellId> = BTreeMap::new();
    let mut queue: VecDeque<CellId> = VecDeque::from([*start]);

    while let Some(current) = queue.pop_front() {
        for precedent in graph.precedents(&current) {
            if precedent == *start {
                let mut path = vec![current];
                let mut cursor = current;
                while let Some(prev) = came_from.get(&cursor) {
                    path.push(*prev);
                    cursor = *prev;
                }
                path.reverse();
                path.push(*start);
                return Some(path);
            }
            if !came_from.contains_key(&precedent) {
                came_from.insert(precedent, current);
                queue.push_back(precedent);
            }
        }
    }

    None
}

/// Whether `cell` lies on any cycle.
pub fn is_on_cycle(cell: &CellId, graph: &DependencyGraph) -> bool {
    detect_cycle(cell, graph).is_some()
}

/// Every cell of `cells` that lies on a cycle, found with one iterative
/// Tarjan pass over the dependent edges inside `cells`.
///
/// `cells` must be closed under dependents (a reachable set, or the whole
/// grid), so no cycle through a member can leave it.
pub fn cycle_members(cells: &BTreeSet<CellId>, graph: &DependencyGraph) -> BTreeSet<CellId> {
    let mut tarjan = Tarjan {
        cells,
        graph,
        index: BTreeMap::new(),
        low: BTreeMap::new(),
        stack: Vec::new(),
        on_stack: BTreeSet::new(),
        frames: Vec::new(),
        members: BTreeSet::new(),
    };
    for root in cells {
        if !tarjan.index.contains_key(root) {
            tarjan.run_from(*root);
        }
    }
    tarjan.members
}

struct Tarjan<'a> {
    cells: &'a BTreeSet<CellId>,
    graph: &'a DependencyGraph,
    index: BTreeMap<CellId, usize>,
    low: BTreeMap<CellId, usize>,
    stack: Vec<CellId>,
    on_stack: BTreeSet<CellId>,
    /// Explicit call stack: (cell, its dependents, next dependent to visit).
    frames: Vec<(CellId, Vec<CellId>, usize)>,
    members: BTreeSet<CellId>,
}

impl Tarjan<'_> {
    fn visit(&mut self, cell: CellId) {
        let n = self.index.len();
        self.index.insert(cell, n);
        self.low.insert(cell, n);
        self.stack.push(cell);
        self.on_stack.insert(cell);
        let next: Vec<CellId> = self
            .graph
            .dependents(&cell)
            .filter(|dep| self.cells.contains(dep))
            .collect();
        self.frames.push((cell, next, 0));
    }

    fn lower(&mut self, cell: CellId, to: usize) {
        if let Some(low) = self.low.get_mut(&cell) {
            *low = (*low).min(to);
        }
    }

    fn run_from(&mut self, root: CellId) {
        self.visit(root);
        while let Some(top) = self.frames.len().checked_sub(1) {
            let (cell, pos) = (self.frames[top].0, self.frames[top].2);
            if let Some(&next) = self.frames[top].1.get(pos) {
                self.frames[top].2 += 1;
                match self.index.get(&next).copied() {
                    None => self.visit(next),
                    Some(seen) if self.on_stack.contains(&next) => self.lower(cell, seen),
                    Some(_) => {}
                }
                continue;
            }

            self.frames.pop();
            let low = self.low[&cell];
            if let Some(&(parent, ..)) = self.frames.last() {
                self.lower(parent, low);
            }
            if low == self.index[&cell] {
                self.pop_component(cell);
            }
        }
    }

    fn pop_component(&mut self, root: CellId) {
        let mut component = Vec::new();
        while let Some(cell) = self.stack.pop() {
            self.on_stack.remove(&cell);
            component.push(cell);
            if cell == root {
                break;
            }
        }
        let self_loop = self.graph.dependents(&root).any(|dep| dep == root);
        if component.len() > 1 || self_loop {
            self.members.extend(component);
        }
    }
}
