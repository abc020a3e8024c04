//! Circular dependency detection for formula cells.
//!
//! When a formula is entered, we must verify it doesn't create a cycle
//! (e.g., A1 references B1, B1 references C1, C1 references A1).
//! This module uses depth-first search to detect such cycles before
//! the formula is installed, so evaluation never recurses forever.

use std::collections::HashSet;

use super::Sheet;
use sheetcell_engine::engine::Position;

/// Check whether giving `target` a formula referencing `references` would
/// create a cycle with the formulas already in `sheet`.
///
/// Returns Some(cycle_path) starting and ending at `target` if so, None otherwise.
pub fn detect_cycle(
    target: &Position,
    references: &[Position],
    sheet: &Sheet,
) -> Option<Vec<Position>> {
    let mut visited = HashSet::new();
    let mut path = vec![*target];

    for reference in references {
        if detect_cycle_dfs(target, reference, sheet, &mut visited, &mut path) {
            return Some(path);
        }
    }
    None
}

fn detect_cycle_dfs(
    target: &Position,
    current: &Position,
    sheet: &Sheet,
    visited: &mut HashSet<Position>,
    path: &mut Vec<Position>,
) -> bool {
    path.push(*current);
    if current == target {
        return true;
    }

    // A cell already explored without reaching the target cannot reach it now.
    if visited.insert(*current) {
        let deps = sheet
            .cell(current)
            .map(|cell| cell.referenced_cells())
            .unwrap_or_default();
        for dep in deps {
            if detect_cycle_dfs(target, dep, sheet, visited, path) {
                return true;
            }
        }
    }

    path.pop();
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(name: &str) -> Position {
        Position::from_str(name).unwrap()
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let sheet = Sheet::new();
        let path = detect_cycle(&pos("A1"), &[pos("A1")], &sheet).unwrap();
        assert_eq!(path, vec![pos("A1"), pos("A1")]);
    }

    #[test]
    fn test_indirect_cycle_path() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("B1"), "=C1").unwrap();
        sheet.set_cell(pos("C1"), "=A1+1").unwrap();

        let path = detect_cycle(&pos("A1"), &[pos("B1")], &sheet).unwrap();
        assert_eq!(path, vec![pos("A1"), pos("B1"), pos("C1"), pos("A1")]);
    }

    #[test]
    fn test_shared_dependencies_are_not_cycles() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("B1"), "=D1").unwrap();
        sheet.set_cell(pos("C1"), "=D1").unwrap();
        sheet.set_cell(pos("D1"), "1").unwrap();

        assert!(detect_cycle(&pos("A1"), &[pos("B1"), pos("C1")], &sheet).is_none());
    }

    #[test]
    fn test_unset_references_are_not_cycles() {
        let sheet = Sheet::new();
        assert!(detect_cycle(&pos("A1"), &[pos("B1"), pos("Z99")], &sheet).is_none());
    }
}
