//! sheetcell_engine - Cell content classification, formulas and cached values.

pub mod engine;
pub mod error;

pub use error::FormulaSyntaxError;
