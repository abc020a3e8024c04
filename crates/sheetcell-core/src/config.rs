//! Sheet configuration.

use serde::{Deserialize, Serialize};

use sheetcell_engine::engine::Position;

/// Bounds of the addressable grid.
///
/// Positions outside these bounds cannot be edited and read as `#REF!` from formulas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub max_rows: usize,
    pub max_cols: usize,
}

impl SheetConfig {
    pub fn contains(&self, pos: &Position) -> bool {
        pos.is_valid() && pos.row < self.max_rows && pos.col < self.max_cols
    }
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig {
            max_rows: Position::MAX_ROWS,
            max_cols: Position::MAX_COLS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SheetConfig;
    use sheetcell_engine::engine::Position;

    #[test]
    fn test_default_covers_whole_grid() {
        let config = SheetConfig::default();
        assert!(config.contains(&Position::new(Position::MAX_ROWS - 1, Position::MAX_COLS - 1)));
        assert!(!config.contains(&Position::new(Position::MAX_ROWS, 0)));
    }

    #[test]
    fn test_limits_never_exceed_position_bounds() {
        let config = SheetConfig {
            max_rows: usize::MAX,
            max_cols: usize::MAX,
        };
        assert!(!config.contains(&Position::new(0, Position::MAX_COLS)));
    }

    #[test]
    fn test_smaller_limits() {
        let config = SheetConfig {
            max_rows: 10,
            max_cols: 2,
        };
        assert!(config.contains(&Position::new(9, 1)));
        assert!(!config.contains(&Position::new(10, 0)));
        assert!(!config.contains(&Position::new(0, 2)));
    }
}
