//! Cell positions and A1 notation.
//!
//! Provides bidirectional conversion between spreadsheet-style cell references
//! (e.g., "A1", "B2", "AA100") and zero-indexed row/column coordinates.
//!
//! # Examples
//!
//! ```
//! use sheetcell_engine::engine::Position;
//!
//! let pos = Position::from_str("B3").unwrap();
//! assert_eq!(pos.col, 1); // 0-indexed
//! assert_eq!(pos.row, 2);
//! assert_eq!(pos.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// The position of a cell by row and column indices (0-indexed).
///
/// Positions order row-major: every cell of row 0 sorts before any cell of row 1.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const MAX_ROWS: usize = 16384;
    pub const MAX_COLS: usize = 16384;

    pub fn new(row: usize, col: usize) -> Position {
        Position { row, col }
    }

    /// Whether the position lies inside the largest grid any sheet supports.
    pub fn is_valid(&self) -> bool {
        self.row < Self::MAX_ROWS && self.col < Self::MAX_COLS
    }

    /// Parse a position from spreadsheet notation (e.g., "A1", "B2", "AA10").
    /// Returns None if the input is invalid.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(name: &str) -> Option<Position> {
        Self::parse_a1(name)
    }

    fn parse_a1(name: &str) -> Option<Position> {
        let caps = a1_re().captures(name)?;
        let letters = &caps["letters"];
        let numbers = &caps["numbers"];

        let mut col_acc = 0usize;
        for c in letters.to_ascii_uppercase().bytes() {
            let digit = (c - b'A') as usize + 1;
            col_acc = col_acc.checked_mul(26)?.checked_add(digit)?;
        }
        let col = col_acc.checked_sub(1)?;

        let row = numbers.parse::<usize>().ok()?.checked_sub(1)?;

        Some(Position::new(row, col))
    }

    /// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }
}

fn a1_re() -> &'static Regex {
    static A1_RE: OnceLock<Regex> = OnceLock::new();
    A1_RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<numbers>[0-9]+)$")
            .expect("A1 position regex must compile")
    })
}

impl std::str::FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_a1(s).ok_or_else(|| format!("Invalid cell position: {}", s))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Position::col_to_letters(self.col), self.row + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::Position;

    #[test]
    fn test_from_str_single_letter_columns() {
        let a1 = Position::from_str("A1").unwrap();
        assert_eq!(a1, Position::new(0, 0));

        let b1 = Position::from_str("B1").unwrap();
        assert_eq!(b1.col, 1);

        let z1 = Position::from_str("Z1").unwrap();
        assert_eq!(z1.col, 25);
    }

    #[test]
    fn test_from_str_multi_letter_columns() {
        assert_eq!(Position::from_str("AA1").unwrap().col, 26);
        assert_eq!(Position::from_str("AZ1").unwrap().col, 51);
        assert_eq!(Position::from_str("BA1").unwrap().col, 52);
    }

    #[test]
    fn test_from_str_case_insensitive() {
        let lower = Position::from_str("a1").unwrap();
        assert_eq!(lower, Position::new(0, 0));

        let mixed = Position::from_str("aA1").unwrap();
        assert_eq!(mixed.col, 26);
    }

    #[test]
    fn test_from_str_invalid_inputs() {
        assert!(Position::from_str("").is_none());
        assert!(Position::from_str("123").is_none());
        assert!(Position::from_str("ABC").is_none());
        assert!(Position::from_str("A0").is_none());
        assert!(Position::from_str("1A").is_none());
        assert!(Position::from_str("A 1").is_none());
    }

    #[test]
    fn test_parse_a1_overflow_returns_none() {
        let huge = format!("{}1", "Z".repeat(40));
        assert!(Position::from_str(&huge).is_none());
    }

    #[test]
    fn test_display_round_trips() {
        for name in ["A1", "Z9", "AA10", "XFD16384"] {
            assert_eq!(Position::from_str(name).unwrap().to_string(), name);
        }
    }

    #[test]
    fn test_validity_bounds() {
        assert!(Position::from_str("XFD16384").unwrap().is_valid());
        assert!(!Position::from_str("XFE1").unwrap().is_valid());
        assert!(!Position::from_str("A16385").unwrap().is_valid());
    }

    #[test]
    fn test_ordering_is_row_major() {
        let mut positions = vec![
            Position::from_str("B1").unwrap(),
            Position::from_str("A2").unwrap(),
            Position::from_str("A1").unwrap(),
        ];
        positions.sort();
        let names: Vec<String> = positions.iter().map(|p| p.to_string()).collect();
        assert_eq!(names, vec!["A1", "B1", "A2"]);
    }

    #[test]
    fn test_col_to_letters_handles_max_usize() {
        let letters = Position::col_to_letters(usize::MAX);
        assert!(!letters.is_empty());
        assert!(letters.chars().all(|c| c.is_ascii_uppercase()));
    }
}
