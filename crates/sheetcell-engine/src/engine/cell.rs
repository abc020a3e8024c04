//! Cell content and the cell facade.
//!
//! - [`Content`] - What a cell currently holds: nothing, literal text, or a formula
//! - [`LiteralText`] - Non-empty text exactly as the user entered it
//! - [`FormulaContent`] - A parsed formula plus its memoized value
//! - [`Cell`] - Owns one [`Content`] and replaces it wholesale on every edit
//!
//! A formula's cached value stays valid until someone calls
//! [`Cell::clear_cache`]. Evaluation is idempotent as long as no referenced
//! cell changes, so the owning sheet only has to clear the caches of the
//! transitive dependents of each cell it mutates.

use log::trace;
use std::cell::OnceCell;

use super::formula::{CellLookup, EvaluationFailure, Formula};
use super::position::Position;
use super::value::{ErrorKind, Value};
use crate::error::FormulaSyntaxError;

/// Leading character that makes the rest of the input literal text.
pub const ESCAPE_MARKER: char = '\'';
/// Leading character of a formula.
pub const FORMULA_MARKER: char = '=';

/// Literal text as entered, including any leading escape marker.
///
/// Never empty: empty input is [`Content::Empty`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiteralText(String);

impl LiteralText {
    /// Returns `None` for empty text.
    pub fn new(raw: impl Into<String>) -> Option<LiteralText> {
        let raw = raw.into();
        if raw.is_empty() { None } else { Some(LiteralText(raw)) }
    }

    pub fn raw(&self) -> &str {
        &self.0
    }

    /// The text with exactly one leading escape marker removed.
    pub fn value(&self) -> Value {
        let text = self.0.strip_prefix(ESCAPE_MARKER).unwrap_or(&self.0);
        Value::Text(text.to_string())
    }
}

/// A formula together with its memoized value.
#[derive(Debug)]
pub struct FormulaContent {
    formula: Formula,
    cache: OnceCell<Value>,
}

impl FormulaContent {
    pub fn new(formula: Formula) -> FormulaContent {
        FormulaContent {
            formula,
            cache: OnceCell::new(),
        }
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    pub fn text(&self) -> String {
        format!("{}{}", FORMULA_MARKER, self.formula.canonical_text())
    }

    /// Return the cached value, or evaluate against `lookup` and cache the result.
    pub fn value(&self, lookup: &dyn CellLookup) -> Value {
        if let Some(value) = self.cache.get() {
            trace!("cache hit for ={}", self.formula);
            return value.clone();
        }

        let value = match self.formula.evaluate(lookup) {
            Ok(n) => Value::Number(n),
            Err(failure) => {
                trace!("={} failed: {}", self.formula, failure);
                Value::Error(error_kind(failure))
            }
        };
        trace!("evaluated ={} to {}", self.formula, value);

        // Already set only if evaluation re-entered this cell.
        let _ = self.cache.set(value.clone());
        value
    }

    pub fn clear_cache(&mut self) {
        self.cache.take();
    }

    pub fn has_cache(&self) -> bool {
        self.cache.get().is_some()
    }
}

impl Clone for FormulaContent {
    /// Copies the formula; the copy starts without a cached value.
    fn clone(&self) -> Self {
        FormulaContent::new(self.formula.clone())
    }
}

/// Errors in referenced cells are reported as [`ErrorKind::PropagatedError`],
/// whatever their original kind.
fn error_kind(failure: EvaluationFailure) -> ErrorKind {
    match failure {
        EvaluationFailure::DivByZero => ErrorKind::DivByZero,
        EvaluationFailure::InvalidReference(_) => ErrorKind::InvalidReference,
        EvaluationFailure::Propagated(_) => ErrorKind::PropagatedError,
        EvaluationFailure::TypeMismatch(_) => ErrorKind::ValueError,
    }
}

/// The content of a cell. Exactly one variant is active at a time.
#[derive(Clone, Debug, Default)]
pub enum Content {
    #[default]
    Empty,
    Literal(LiteralText),
    Formula(FormulaContent),
}

impl Content {
    /// Classify user input.
    /// - Empty string -> Empty
    /// - `=` followed by anything -> Formula (the rest must parse)
    /// - Anything else, including a lone `=` or a leading `'` -> Literal
    pub fn classify(text: &str) -> Result<Content, FormulaSyntaxError> {
        if let Some(body) = text.strip_prefix(FORMULA_MARKER)
            && !body.is_empty()
        {
            let formula = Formula::parse(body)?;
            return Ok(Content::Formula(FormulaContent::new(formula)));
        }

        Ok(LiteralText::new(text).map_or(Content::Empty, Content::Literal))
    }

    pub fn text(&self) -> String {
        match self {
            Content::Empty => String::new(),
            Content::Literal(literal) => literal.raw().to_string(),
            Content::Formula(formula) => formula.text(),
        }
    }

    pub fn value(&self, lookup: &dyn CellLookup) -> Value {
        match self {
            Content::Empty => Value::empty(),
            Content::Literal(literal) => literal.value(),
            Content::Formula(formula) => formula.value(lookup),
        }
    }

    pub fn referenced_cells(&self) -> &[Position] {
        match self {
            Content::Empty => &[],
            Content::Literal(_) => &[],
            Content::Formula(formula) => formula.formula().referenced_positions(),
        }
    }

    pub fn clear_cache(&mut self) {
        match self {
            Content::Empty | Content::Literal(_) => {}
            Content::Formula(formula) => formula.clear_cache(),
        }
    }

    pub fn has_cache(&self) -> bool {
        match self {
            Content::Empty | Content::Literal(_) => false,
            Content::Formula(formula) => formula.has_cache(),
        }
    }
}

/// A single spreadsheet cell.
///
/// Cloning copies the content but never the cached value, the same as
/// creating a new cell and setting it to the original's text.
#[derive(Clone, Debug, Default)]
pub struct Cell {
    content: Content,
}

impl Cell {
    pub fn new() -> Cell {
        Cell::default()
    }

    /// Create a cell from user input.
    pub fn from_input(text: &str) -> Result<Cell, FormulaSyntaxError> {
        let mut cell = Cell::new();
        cell.set(text)?;
        Ok(cell)
    }

    /// Replace the content with `text`. On a syntax error the cell is left untouched.
    pub fn set(&mut self, text: &str) -> Result<(), FormulaSyntaxError> {
        let content = Content::classify(text)?;
        self.install(content);
        Ok(())
    }

    /// Replace the content with already classified content.
    ///
    /// Lets an owner inspect the new references (e.g. for cycles) before committing.
    pub fn install(&mut self, content: Content) {
        self.content = content;
    }

    pub fn clear(&mut self) {
        self.content = Content::Empty;
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.content, Content::Empty)
    }

    pub fn value(&self, lookup: &dyn CellLookup) -> Value {
        self.content.value(lookup)
    }

    pub fn text(&self) -> String {
        self.content.text()
    }

    pub fn referenced_cells(&self) -> &[Position] {
        self.content.referenced_cells()
    }

    pub fn clear_cache(&mut self) {
        self.content.clear_cache();
    }

    pub fn has_cache(&self) -> bool {
        self.content.has_cache()
    }
}
