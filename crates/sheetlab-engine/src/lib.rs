//! sheetlab_engine - Formula evaluation, dependency tracking and recalculation.

pub mod engine;

#[cfg(test)]
mod tests {
    use crate::engine::*;

    fn id(name: &str) -> CellId {
        name.parse().unwrap()
    }

    /// Commit a formula the way the document layer does: rewire, store, propagate.
    fn commit(graph: &mut DependencyGraph, grid: &mut Grid, name: &str, formula: &str) -> Propagation {
        let bounds = GridBounds::default();
        let cell = id(name);
        graph.update_references(cell, formula, &bounds);
        grid.entry(cell)
            .or_insert_with(|| Cell::new_empty(cell))
            .formula = Some(formula.to_string());
        propagate(&cell, graph, grid, &bounds)
    }

    #[test]
    fn test_from_str_case_insensitive() {
        let lower: CellId = "a1".parse().unwrap();
        assert_eq!(lower, CellId::new(0, 0));
        assert_eq!(lower.to_string(), "A1");
        assert_eq!("h10".parse::<CellId>().unwrap(), CellId::new(7, 9));
    }

    #[test]
    fn test_from_str_invalid_inputs() {
        assert!("".parse::<CellId>().is_err());
        assert!("123".parse::<CellId>().is_err());
        assert!("ABC".parse::<CellId>().is_err());
        assert!("A0".parse::<CellId>().is_err());
        assert!("1A".parse::<CellId>().is_err());
        assert!("A 1".parse::<CellId>().is_err());
    }

    #[test]
    fn test_literal_round_trip() {
        let mut graph = DependencyGraph::new();
        let mut grid = Grid::new();
        commit(&mut graph, &mut grid, "A1", "10");
        let cell = &grid[&id("A1")];
        assert_eq!(cell.value, Value::Number(10.0));
        assert_eq!(cell.display, "10");
    }

    #[test]
    fn test_reference_and_propagation() {
        let mut graph = DependencyGraph::new();
        let mut grid = Grid::new();
        commit(&mut graph, &mut grid, "A1", "10");
        commit(&mut graph, &mut grid, "A2", "20");
        commit(&mut graph, &mut grid, "B1", "=A1+A2");
        assert_eq!(grid[&id("B1")].value, Value::Number(30.0));

        let result = commit(&mut graph, &mut grid, "A1", "5");
        assert_eq!(result.affected, vec![id("B1")]);
        assert_eq!(grid[&id("B1")].value, Value::Number(25.0));
    }

    #[test]
    fn test_sum_interior_cell_propagates() {
        let mut graph = DependencyGraph::new();
        let mut grid = Grid::new();
        commit(&mut graph, &mut grid, "A1", "1");
        commit(&mut graph, &mut grid, "A2", "2");
        commit(&mut graph, &mut grid, "A3", "3");
        commit(&mut graph, &mut grid, "B1", "=SUM(A1:A3)");
        assert_eq!(grid[&id("B1")].display, "6");

        let result = commit(&mut graph, &mut grid, "A2", "20");
        assert_eq!(result.affected, vec![id("B1")]);
        assert_eq!(grid[&id("B1")].value, Value::Number(24.0));
    }

    #[test]
    fn test_error_chains_read_as_zero() {
        let mut graph = DependencyGraph::new();
        let mut grid = Grid::new();
        commit(&mut graph, &mut grid, "A1", "=1/0");
        commit(&mut graph, &mut grid, "A2", "=A1+2");
        assert_eq!(grid[&id("A1")].display, ERROR_SENTINEL);
        assert_eq!(grid[&id("A2")].value, Value::Number(2.0));
    }

    #[test]
    fn test_malformed_formula_does_not_disturb_neighbours() {
        let mut graph = DependencyGraph::new();
        let mut grid = Grid::new();
        commit(&mut graph, &mut grid, "A1", "4");
        commit(&mut graph, &mut grid, "B1", "=A1*2");
        commit(&mut graph, &mut grid, "C1", "=A1+");
        assert_eq!(grid[&id("C1")].value, Value::Error);
        assert_eq!(grid[&id("B1")].value, Value::Number(8.0));

        // C1 still tracks A1 even though it failed to parse.
        let result = commit(&mut graph, &mut grid, "A1", "5");
        assert_eq!(result.affected, vec![id("B1"), id("C1")]);
        assert_eq!(grid[&id("B1")].value, Value::Number(10.0));
        assert_eq!(grid[&id("C1")].value, Value::Error);
    }

    #[test]
    fn test_parse_formula_reports_reason() {
        let err = parse_formula("A1+", &GridBounds::default()).unwrap_err();
        assert_eq!(err, ParseError::UnexpectedEnd);
        assert_eq!(err.to_string(), "unexpected end of formula");
    }
}
