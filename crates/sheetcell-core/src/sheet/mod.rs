//! Sheet state and lookups (UI-agnostic).

mod cycle;
mod ops;

pub use cycle::detect_cycle;

use crate::config::SheetConfig;
use crate::error::{Result, SheetError};
use sheetcell_engine::engine::{Cell, CellLookup, Position, Value};
use std::collections::{HashMap, HashSet};

/// A sheet of cells addressed by position.
///
/// The sheet keeps every formula's cache honest: after each edit it clears the
/// caches of all cells that transitively reference the edited cell, and it
/// refuses edits that would make a formula depend on itself.
#[derive(Debug, Default)]
pub struct Sheet {
    /// Non-empty cells
    cells: HashMap<Position, Cell>,
    /// Reverse dependency map: cell -> cells whose formulas reference it
    dependents: HashMap<Position, HashSet<Position>>,
    config: SheetConfig,
}

impl Sheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SheetConfig) -> Self {
        Sheet {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    /// The cell at `pos`, if it holds anything.
    pub fn cell(&self, pos: &Position) -> Option<&Cell> {
        self.cells.get(pos)
    }

    /// Number of non-empty cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn value(&self, pos: &Position) -> Result<Value> {
        self.check_position(pos)?;
        Ok(self
            .cells
            .get(pos)
            .map(|cell| cell.value(self))
            .unwrap_or_else(Value::empty))
    }

    pub fn text(&self, pos: &Position) -> Result<String> {
        self.check_position(pos)?;
        Ok(self.cells.get(pos).map(Cell::text).unwrap_or_default())
    }

    pub fn referenced_cells(&self, pos: &Position) -> Result<Vec<Position>> {
        self.check_position(pos)?;
        Ok(self
            .cells
            .get(pos)
            .map(|cell| cell.referenced_cells().to_vec())
            .unwrap_or_default())
    }

    /// Cells whose formulas reference `pos` directly, sorted.
    pub fn dependents(&self, pos: &Position) -> Vec<Position> {
        let mut deps: Vec<Position> = self
            .dependents
            .get(pos)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        deps.sort();
        deps
    }

    pub(crate) fn check_position(&self, pos: &Position) -> Result<()> {
        if self.config.contains(pos) {
            Ok(())
        } else {
            Err(SheetError::InvalidPosition(*pos))
        }
    }
}

impl CellLookup for Sheet {
    /// Positions outside the sheet resolve to `None`; unset ones read as empty.
    fn resolve(&self, pos: &Position) -> Option<Value> {
        if !self.config.contains(pos) {
            return None;
        }
        Some(
            self.cells
                .get(pos)
                .map(|cell| cell.value(self))
                .unwrap_or_else(Value::empty),
        )
    }
}
