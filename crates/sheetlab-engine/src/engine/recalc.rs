//! Ordered recalculation.
//!
//! After an edit, every cell reachable from the edited cell is recomputed
//! exactly once, precedents before dependents (Kahn's algorithm, ties broken
//! row-major). Cells on a cycle cannot be ordered; they are set to
//! [`Value::Error`] before anything else is evaluated, so cells downstream of
//! a cycle read them as `#ERR`.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use super::cell::{Cell, Grid, Value};
use super::cell_ref::{CellId, GridBounds};
use super::cycle::cycle_members;
use super::eval::evaluate;
use super::graph::DependencyGraph;

/// Evaluation plan for a set of cells.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schedule {
    /// Acyclic cells in dependency order.
    pub order: Vec<CellId>,
    /// Cells lying on a cycle, row-major.
    pub cycles: Vec<CellId>,
}

/// Outcome of a propagation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Propagation {
    /// Recomputed cells other than the origin: cycle members first, then
    /// evaluation order.
    pub affected: Vec<CellId>,
    /// Cells set to the error sentinel because they lie on a cycle.
    pub cycles: Vec<CellId>,
}

/// Order `cells` for evaluation. Precedents outside `cells` are treated as
/// already settled.
pub fn schedule(cells: &BTreeSet<CellId>, graph: &DependencyGraph) -> Schedule {
    let cycles = cycle_members(cells, graph);
    let acyclic: BTreeSet<CellId> = cells.difference(&cycles).copied().collect();

    let mut in_degree: BTreeMap<CellId, usize> = acyclic
        .iter()
        .map(|cell| {
            let count = graph.precedents(cell).filter(|p| acyclic.contains(p)).count();
            (*cell, count)
        })
        .collect();

    // BTreeSet as a priority queue keeps the order deterministic.
    let mut ready: BTreeSet<CellId> = in_degree
        .iter()
        .filter(|(_, deg)| **deg == 0)
        .map(|(cell, _)| *cell)
        .collect();
    let mut order = Vec::with_capacity(acyclic.len());

    while let Some(cell) = ready.pop_first() {
        order.push(cell);
        for dep in graph.dependents(&cell) {
            if let Some(deg) = in_degree.get_mut(&dep) {
                *deg -= 1;
                if *deg == 0 {
                    ready.insert(dep);
                }
            }
        }
    }

    debug_assert_eq!(order.len(), acyclic.len(), "cycle members must be removed before ordering");

    Schedule {
        order,
        cycles: cycles.into_iter().collect(),
    }
}

/// Recompute `origin` and everything that depends on it.
pub fn propagate(
    origin: &CellId,
    graph: &DependencyGraph,
    grid: &mut Grid,
    bounds: &GridBounds,
) -> Propagation {
    let reachable = graph.reachable_from(origin);
    let plan = schedule(&reachable, graph);
    let propagation = run(&plan, grid, bounds, Some(origin));
    debug!(
        origin = %origin,
        reachable = reachable.len(),
        affected = propagation.affected.len(),
        cycles = propagation.cycles.len(),
        "propagated edit"
    );
    propagation
}

/// Recompute every cell in the grid.
pub fn recalculate_all(graph: &DependencyGraph, grid: &mut Grid, bounds: &GridBounds) -> Propagation {
    let cells: BTreeSet<CellId> = grid.keys().copied().collect();
    let plan = schedule(&cells, graph);
    let propagation = run(&plan, grid, bounds, None);
    debug!(
        cells = cells.len(),
        cycles = propagation.cycles.len(),
        "recalculated grid"
    );
    propagation
}

fn run(plan: &Schedule, grid: &mut Grid, bounds: &GridBounds, origin: Option<&CellId>) -> Propagation {
    if !plan.cycles.is_empty() {
        let names: Vec<String> = plan.cycles.iter().map(ToString::to_string).collect();
        warn!(cells = %names.join(","), "circular reference detected");
    }

    let mut affected = Vec::with_capacity(plan.cycles.len() + plan.order.len());
    for cell in &plan.cycles {
        grid.entry(*cell)
            .or_insert_with(|| Cell::new_empty(*cell))
            .set_value(Value::Error);
        affected.push(*cell);
    }
    for cell in &plan.order {
        let formula = grid.get(cell).map(|c| c.formula_text().to_string()).unwrap_or_default();
        let value = evaluate(&formula, grid, bounds);
        grid.entry(*cell)
            .or_insert_with(|| Cell::new_empty(*cell))
            .set_value(value);
        affected.push(*cell);
    }
    if let Some(origin) = origin {
        affected.retain(|cell| cell != origin);
    }

    Propagation {
        affected,
        cycles: plan.cycles.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> CellId {
        name.parse().unwrap()
    }

    struct Fixture {
        graph: DependencyGraph,
        grid: Grid,
        bounds: GridBounds,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                graph: DependencyGraph::new(),
                grid: Grid::new(),
                bounds: GridBounds::default(),
            }
        }

        fn set(&mut self, name: &str, formula: &str) -> Propagation {
            let cell = id(name);
            self.graph.update_references(cell, formula, &self.bounds);
            self.grid.insert(cell, Cell::with_formula(cell, formula));
            propagate(&cell, &self.graph, &mut self.grid, &self.bounds)
        }

        fn value(&self, name: &str) -> Value {
            self.grid.get(&id(name)).map(|c| c.value.clone()).unwrap_or_default()
        }
    }

    fn names(cells: &[CellId]) -> Vec<String> {
        cells.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_chain_propagates_in_order() {
        let mut fx = Fixture::new();
        fx.set("A1", "1");
        fx.set("A2", "=A1+1");
        fx.set("A3", "=A2+1");
        let result = fx.set("A1", "10");
        assert_eq!(names(&result.affected), vec!["A2", "A3"]);
        assert_eq!(fx.value("A3"), Value::Number(12.0));
    }

    #[test]
    fn test_diamond_evaluates_join_after_both_branches() {
        let mut fx = Fixture::new();
        fx.set("A1", "1");
        fx.set("B1", "=A1*2");
        fx.set("C1", "=A1*3");
        // D1 depends on B1 directly and on A1 through C1.
        fx.set("D1", "=B1+C1+A1");
        let result = fx.set("A1", "2");
        assert_eq!(names(&result.affected), vec!["B1", "C1", "D1"]);
        assert_eq!(fx.value("D1"), Value::Number(12.0));
    }

    #[test]
    fn test_schedule_puts_precedents_first() {
        let mut fx = Fixture::new();
        fx.set("A2", "=B2");
        fx.set("B2", "=C2");
        fx.set("C2", "1");
        let plan = schedule(&fx.graph.reachable_from(&id("C2")), &fx.graph);
        assert_eq!(names(&plan.order), vec!["C2", "B2", "A2"]);
        assert!(plan.cycles.is_empty());
    }

    #[test]
    fn test_cycle_members_become_errors() {
        let mut fx = Fixture::new();
        fx.set("A1", "=B1");
        let result = fx.set("B1", "=A1");
        assert_eq!(names(&result.cycles), vec!["A1", "B1"]);
        assert_eq!(fx.value("A1"), Value::Error);
        assert_eq!(fx.value("B1"), Value::Error);
    }

    #[test]
    fn test_downstream_of_cycle_reads_error_as_zero() {
        let mut fx = Fixture::new();
        fx.set("C1", "=A1+5");
        fx.set("A1", "=B1");
        fx.set("B1", "=A1");
        assert_eq!(fx.value("C1"), Value::Number(5.0));
    }

    #[test]
    fn test_breaking_cycle_recovers_values() {
        let mut fx = Fixture::new();
        fx.set("A1", "=B1+1");
        fx.set("B1", "=A1");
        assert_eq!(fx.value("A1"), Value::Error);
        fx.set("B1", "4");
        assert_eq!(fx.value("A1"), Value::Number(5.0));
    }

    #[test]
    fn test_recalculate_all_is_idempotent() {
        let mut fx = Fixture::new();
        fx.set("A1", "3");
        fx.set("A2", "=A1*A1");
        fx.set("A3", "=SUM(A1:A2)/4");
        let before = fx.grid.clone();
        recalculate_all(&fx.graph, &mut fx.grid, &fx.bounds);
        recalculate_all(&fx.graph, &mut fx.grid, &fx.bounds);
        assert_eq!(fx.grid, before);
    }
}
