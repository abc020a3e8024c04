//! sheetcell-core - Sheet model: cell storage, dependency graph, invalidation.

pub mod config;
pub mod error;
pub mod sheet;

pub use config::SheetConfig;
pub use error::{Result, SheetError};
pub use sheet::{Sheet, detect_cycle};

pub use sheetcell_engine::engine::{Cell, ErrorKind, Position, Value};
