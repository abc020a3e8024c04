//! Error types for the Sheetcell engine.

use thiserror::Error;

/// A formula's text could not be parsed.
///
/// `offset` is the byte offset into the expression text (after the leading `=`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Formula syntax error at {offset}: {message}")]
pub struct FormulaSyntaxError {
    pub message: String,
    pub offset: usize,
}

impl FormulaSyntaxError {
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        FormulaSyntaxError {
            message: message.into(),
            offset,
        }
    }
}
