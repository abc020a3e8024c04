//! Parsed formulas.
//!
//! A [`Formula`] owns the expression tree of one formula cell along with the
//! positions it references. It can print itself back in canonical form and
//! evaluate itself against any [`CellLookup`]; it never touches cells directly.

use std::fmt::{self, Write as _};
use thiserror::Error;

use super::parser::parse_expression;
use super::position::Position;
use super::value::{ErrorKind, NumberCoercion, Value};
use crate::error::FormulaSyntaxError;

/// Resolves referenced positions to their current values during evaluation.
///
/// `None` means the position does not exist in the sheet.
pub trait CellLookup {
    fn resolve(&self, pos: &Position) -> Option<Value>;
}

impl<F> CellLookup for F
where
    F: Fn(&Position) -> Option<Value>,
{
    fn resolve(&self, pos: &Position) -> Option<Value> {
        self(pos)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Subtract => '-',
            BinaryOp::Multiply => '*',
            BinaryOp::Divide => '/',
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Subtract => 1,
            BinaryOp::Multiply | BinaryOp::Divide => 2,
        }
    }
}

/// Formula expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Non-negative finite literal; negation is a [`UnaryOp::Minus`] node.
    Number(f64),
    Cell(Position),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Unary { .. } => 3,
            Expr::Number(_) | Expr::Cell(_) => 4,
        }
    }

    fn collect_positions(&self, out: &mut Vec<Position>) {
        match self {
            Expr::Number(_) => {}
            Expr::Cell(pos) => out.push(*pos),
            Expr::Unary { operand, .. } => operand.collect_positions(out),
            Expr::Binary { left, right, .. } => {
                left.collect_positions(out);
                right.collect_positions(out);
            }
        }
    }

    fn write_canonical(&self, out: &mut String) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(out, "{}", n),
            Expr::Cell(pos) => write!(out, "{}", pos),
            Expr::Unary { op, operand } => {
                out.push(match op {
                    UnaryOp::Plus => '+',
                    UnaryOp::Minus => '-',
                });
                operand.write_operand(out, operand.precedence() < self.precedence())
            }
            Expr::Binary { op, left, right } => {
                let prec = op.precedence();
                left.write_operand(out, left.precedence() < prec)?;
                out.push(op.symbol());
                // Equal precedence on the right keeps its parentheses: a-(b-c), a+(b+c).
                right.write_operand(out, right.precedence() <= prec)
            }
        }
    }

    fn write_operand(&self, out: &mut String, parenthesize: bool) -> fmt::Result {
        if parenthesize {
            out.push('(');
            self.write_canonical(out)?;
            out.push(')');
            Ok(())
        } else {
            self.write_canonical(out)
        }
    }

    fn evaluate(&self, lookup: &dyn CellLookup) -> Result<f64, EvaluationFailure> {
        match self {
            Expr::Number(n) => Ok(*n),
            Expr::Cell(pos) => {
                if !pos.is_valid() {
                    return Err(EvaluationFailure::InvalidReference(*pos));
                }
                let value = lookup
                    .resolve(pos)
                    .ok_or(EvaluationFailure::InvalidReference(*pos))?;
                value.as_number().map_err(|reason| match reason {
                    NumberCoercion::NotANumber => EvaluationFailure::TypeMismatch(*pos),
                    NumberCoercion::Error(kind) => EvaluationFailure::Propagated(kind),
                })
            }
            Expr::Unary { op, operand } => {
                let n = operand.evaluate(lookup)?;
                Ok(match op {
                    UnaryOp::Plus => n,
                    UnaryOp::Minus => -n,
                })
            }
            Expr::Binary { op, left, right } => {
                let lhs = left.evaluate(lookup)?;
                let rhs = right.evaluate(lookup)?;
                let result = match op {
                    BinaryOp::Add => lhs + rhs,
                    BinaryOp::Subtract => lhs - rhs,
                    BinaryOp::Multiply => lhs * rhs,
                    BinaryOp::Divide => {
                        if rhs == 0.0 {
                            return Err(EvaluationFailure::DivByZero);
                        }
                        lhs / rhs
                    }
                };
                if result.is_finite() {
                    Ok(result)
                } else {
                    Err(EvaluationFailure::DivByZero)
                }
            }
        }
    }
}

/// Why a formula could not produce a number.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationFailure {
    #[error("division by zero")]
    DivByZero,

    #[error("reference to invalid position {0}")]
    InvalidReference(Position),

    #[error("referenced cell evaluates to {0}")]
    Propagated(ErrorKind),

    #[error("cell {0} does not contain a number")]
    TypeMismatch(Position),
}

/// A parsed formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    expr: Expr,
    references: Vec<Position>,
}

impl Formula {
    /// Parse a formula body (the text after `=`).
    pub fn parse(body: &str) -> Result<Formula, FormulaSyntaxError> {
        let expr = parse_expression(body)?;
        Ok(Formula::from_expr(expr))
    }

    pub fn from_expr(expr: Expr) -> Formula {
        let mut references = Vec::new();
        expr.collect_positions(&mut references);
        references.sort();
        references.dedup();
        Formula { expr, references }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Print the formula body with the fewest parentheses that still parse
    /// back to the same tree.
    pub fn canonical_text(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.expr.write_canonical(&mut out);
        out
    }

    /// Positions referenced by the formula, sorted row-major without duplicates.
    pub fn referenced_positions(&self) -> &[Position] {
        &self.references
    }

    /// Evaluate left to right; the first failure wins.
    pub fn evaluate(&self, lookup: &dyn CellLookup) -> Result<f64, EvaluationFailure> {
        self.expr.evaluate(lookup)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_text())
    }
}
