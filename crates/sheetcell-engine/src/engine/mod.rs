//! Cell engine API.
//!
//! This module provides the per-cell computation model:
//!
//! - [`Position`] - Cell positions (A1 notation ↔ row/col indices)
//! - [`Value`], [`ErrorKind`] - Evaluated results
//! - [`Formula`], [`Expr`] - Parsed formulas, canonical printing and evaluation
//! - [`CellLookup`] - How a formula reads the cells it references
//! - [`Cell`], [`Content`] - Content classification and the formula value cache

mod cell;
mod formula;
mod parser;
mod position;
mod value;

pub use cell::{Cell, Content, ESCAPE_MARKER, FORMULA_MARKER, FormulaContent, LiteralText};
pub use formula::{BinaryOp, CellLookup, EvaluationFailure, Expr, Formula, UnaryOp};
pub use position::Position;
pub use value::{ErrorKind, NumberCoercion, Value};
