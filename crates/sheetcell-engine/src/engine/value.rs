//! Evaluated cell values.
//!
//! - [`Value`] - Number, Text, or Error; what a cell reads as
//! - [`ErrorKind`] - The closed set of formula failure categories

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a formula failure.
///
/// Errors compare by kind only. The display token is for presentation.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Division by zero, or arithmetic that overflowed to a non-finite number.
    DivByZero,
    /// A referenced position is outside the sheet.
    InvalidReference,
    /// A referenced cell itself evaluates to an error.
    PropagatedError,
    /// A referenced cell holds text that cannot be read as a number.
    ValueError,
}

impl ErrorKind {
    /// Get the display token for this error.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::DivByZero => "#DIV/0!",
            ErrorKind::InvalidReference => "#REF!",
            ErrorKind::PropagatedError => "#ERR!",
            ErrorKind::ValueError => "#VALUE!",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of reading a cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    Text(String),
    Error(ErrorKind),
}

/// Why a value could not be used where a formula needs a number.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NumberCoercion {
    /// The value is text that does not spell a number.
    NotANumber,
    /// The value is itself an error.
    Error(ErrorKind),
}

impl Value {
    /// The value of an empty cell.
    pub fn empty() -> Value {
        Value::Text(String::new())
    }

    /// Read the value as a number, the way formula operands see it.
    ///
    /// Empty text counts as zero. Other text must parse entirely as a finite number.
    pub fn as_number(&self) -> Result<f64, NumberCoercion> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Text(s) if s.is_empty() => Ok(0.0),
            Value::Text(s) => match s.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(n),
                _ => Err(NumberCoercion::NotANumber),
            },
            Value::Error(kind) => Err(NumberCoercion::Error(*kind)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::Error(kind) => write!(f, "{}", kind),
        }
    }
}
