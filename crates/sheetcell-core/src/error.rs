//! Error types for Sheetcell core.

use thiserror::Error;

use sheetcell_engine::FormulaSyntaxError;
use sheetcell_engine::engine::Position;

/// Errors from editing a sheet. The sheet is unchanged when one is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    #[error(transparent)]
    FormulaSyntax(#[from] FormulaSyntaxError),

    #[error("Circular dependency detected at {at}: {}", format_path(.path))]
    CircularReference { at: Position, path: Vec<Position> },

    #[error("Position {0} is outside the sheet")]
    InvalidPosition(Position),
}

fn format_path(path: &[Position]) -> String {
    path.iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = std::result::Result<T, SheetError>;
