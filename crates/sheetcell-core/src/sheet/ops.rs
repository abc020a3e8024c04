use super::{Sheet, detect_cycle};
use crate::error::{Result, SheetError};
use log::debug;
use sheetcell_engine::engine::{Content, Position};
use std::collections::HashSet;

impl Sheet {
    /// Clear the cached values of every cell that depends (transitively) on the changed cell.
    fn invalidate_dependents(&mut self, changed: &Position) {
        let mut to_process = vec![*changed];
        let mut visited = HashSet::new();
        while let Some(pos) = to_process.pop() {
            if !visited.insert(pos) {
                continue;
            }

            if let Some(deps) = self.dependents.get(&pos) {
                for dep in deps.clone() {
                    if let Some(cell) = self.cells.get_mut(&dep) {
                        cell.clear_cache();
                    }
                    to_process.push(dep);
                }
            }
        }
        debug!("{} edited, {} dependent cell(s) invalidated", changed, visited.len() - 1);
    }

    fn link_dependencies(&mut self, pos: &Position, references: &[Position]) {
        for reference in references {
            self.dependents.entry(*reference).or_default().insert(*pos);
        }
    }

    fn unlink_dependencies(&mut self, pos: &Position) {
        let Some(cell) = self.cells.get(pos) else {
            return;
        };
        for reference in cell.referenced_cells() {
            if let Some(deps) = self.dependents.get_mut(reference) {
                deps.remove(pos);
                if deps.is_empty() {
                    self.dependents.remove(reference);
                }
            }
        }
    }

    /// Set cell contents from input text.
    ///
    /// Fails without touching the sheet if the position is out of bounds, the
    /// formula does not parse, or the formula would reference itself.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<()> {
        self.check_position(&pos)?;
        let content = Content::classify(text)?;

        let current_text = self.cells.get(&pos).map(|cell| cell.text()).unwrap_or_default();
        if current_text == content.text() {
            debug!("{} unchanged", pos);
            return Ok(());
        }

        if let Some(path) = detect_cycle(&pos, content.referenced_cells(), self) {
            debug!("rejected edit of {}: circular reference", pos);
            return Err(SheetError::CircularReference { at: pos, path });
        }

        let references = content.referenced_cells().to_vec();
        self.unlink_dependencies(&pos);
        if matches!(content, Content::Empty) {
            self.cells.remove(&pos);
        } else {
            self.cells.entry(pos).or_default().install(content);
        }
        self.link_dependencies(&pos, &references);
        debug!("set {} to {:?}", pos, text);

        self.invalidate_dependents(&pos);
        Ok(())
    }

    /// Clear the specified cell.
    pub fn clear_cell(&mut self, pos: &Position) -> Result<()> {
        self.check_position(pos)?;
        if self.cells.contains_key(pos) {
            self.unlink_dependencies(pos);
            self.cells.remove(pos);
            debug!("cleared {}", pos);
            self.invalidate_dependents(pos);
        }
        Ok(())
    }
}
