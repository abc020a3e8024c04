//! Formula parser.
//!
//! A recursive descent parser for arithmetic formulas over numbers and cell
//! positions, with the usual operator precedence:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := NUMBER | CELL | '(' expr ')'
//! ```
//!
//! The input is the formula body without its leading `=`.

use super::formula::{BinaryOp, Expr, UnaryOp};
use super::position::Position;
use crate::error::FormulaSyntaxError;

/// Deepest nesting of parentheses and unary signs the parser recurses into.
const MAX_NESTING: usize = 256;
/// Tallest expression tree accepted; long operator chains grow the tree too.
const MAX_HEIGHT: usize = 1024;

/// Parse an expression body into an AST.
pub(crate) fn parse_expression(input: &str) -> Result<Expr, FormulaSyntaxError> {
    let mut parser = Parser::new(input)?;
    let (expr, _) = parser.parse_expr()?;

    if parser.current != Token::Eof {
        return Err(parser.error(format!(
            "unexpected {} after expression",
            parser.current.describe()
        )));
    }

    Ok(expr)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Cell(Position),
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::Cell(pos) => format!("cell {}", pos),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::LeftParen => "'('".to_string(),
            Token::RightParen => "')'".to_string(),
            Token::Eof => "end of formula".to_string(),
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    current: Token,
    /// Byte offset where `current` starts.
    token_start: usize,
    /// Open parentheses and unary signs around the current token.
    nesting: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self, FormulaSyntaxError> {
        let mut parser = Parser {
            input,
            pos: 0,
            current: Token::Eof,
            token_start: 0,
            nesting: 0,
        };
        parser.advance()?;
        Ok(parser)
    }

    fn error(&self, message: impl Into<String>) -> FormulaSyntaxError {
        FormulaSyntaxError::new(message, self.token_start)
    }

    // === Grammar ===
    //
    // Each rule returns the parsed tree with its height, so that evaluating,
    // printing and dropping the tree stay within MAX_HEIGHT stack frames.

    fn parse_expr(&mut self) -> Result<(Expr, usize), FormulaSyntaxError> {
        let (mut left, mut height) = self.parse_term()?;
        loop {
            let op = match self.current {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Subtract,
                _ => return Ok((left, height)),
            };
            self.advance()?;
            let (right, right_height) = self.parse_term()?;
            height = self.grow(height.max(right_height))?;
            left = Expr::binary(op, left, right);
        }
    }

    fn parse_term(&mut self) -> Result<(Expr, usize), FormulaSyntaxError> {
        let (mut left, mut height) = self.parse_unary()?;
        loop {
            let op = match self.current {
                Token::Star => BinaryOp::Multiply,
                Token::Slash => BinaryOp::Divide,
                _ => return Ok((left, height)),
            };
            self.advance()?;
            let (right, right_height) = self.parse_unary()?;
            height = self.grow(height.max(right_height))?;
            left = Expr::binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> Result<(Expr, usize), FormulaSyntaxError> {
        let op = match self.current {
            Token::Plus => UnaryOp::Plus,
            Token::Minus => UnaryOp::Minus,
            _ => return self.parse_primary(),
        };
        self.enter()?;
        self.advance()?;
        let (operand, height) = self.parse_unary()?;
        self.nesting -= 1;
        Ok((Expr::unary(op, operand), self.grow(height)?))
    }

    fn parse_primary(&mut self) -> Result<(Expr, usize), FormulaSyntaxError> {
        match self.current.clone() {
            Token::Number(n) => {
                self.advance()?;
                Ok((Expr::Number(n), 1))
            }
            Token::Cell(pos) => {
                self.advance()?;
                Ok((Expr::Cell(pos), 1))
            }
            Token::LeftParen => {
                self.enter()?;
                self.advance()?;
                let inner = self.parse_expr()?;
                if self.current != Token::RightParen {
                    return Err(self.error(format!(
                        "expected ')' but found {}",
                        self.current.describe()
                    )));
                }
                self.advance()?;
                self.nesting -= 1;
                Ok(inner)
            }
            other => Err(self.error(format!("unexpected {}", other.describe()))),
        }
    }

    /// Count one more level of parentheses or unary signs.
    fn enter(&mut self) -> Result<(), FormulaSyntaxError> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            return Err(self.error("formula nested too deeply"));
        }
        Ok(())
    }

    /// Height of a new node above a child of height `child`.
    fn grow(&self, child: usize) -> Result<usize, FormulaSyntaxError> {
        let height = child + 1;
        if height > MAX_HEIGHT {
            return Err(self.error("formula too long"));
        }
        Ok(height)
    }

    // === Token scanning ===

    fn advance(&mut self) -> Result<(), FormulaSyntaxError> {
        self.skip_whitespace();
        self.token_start = self.pos;
        self.current = self.scan_token()?;
        Ok(())
    }

    fn scan_token(&mut self) -> Result<Token, FormulaSyntaxError> {
        let Some(c) = self.peek_char() else {
            return Ok(Token::Eof);
        };

        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            self.pos += 1;
            return Ok(token);
        }

        if c.is_ascii_digit() || c == '.' {
            return self.scan_number();
        }

        if c.is_ascii_alphabetic() {
            return self.scan_cell();
        }

        Err(FormulaSyntaxError::new(
            format!("unexpected character '{}'", c),
            self.pos,
        ))
    }

    fn scan_number(&mut self) -> Result<Token, FormulaSyntaxError> {
        let start = self.pos;
        self.consume_digits();

        if self.peek_char() == Some('.') {
            self.pos += 1;
            self.consume_digits();
        }

        // Exponent only when digits actually follow, so "2E" stays an error below.
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.pos += 1;
            }
            if self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.consume_digits();
            } else {
                self.pos = mark;
            }
        }

        let text = &self.input[start..self.pos];
        if self.peek_char().is_some_and(|c| c.is_ascii_alphanumeric() || c == '.') {
            return Err(FormulaSyntaxError::new(
                format!("malformed number '{}'", text),
                start,
            ));
        }

        match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Token::Number(n)),
            Ok(_) => Err(FormulaSyntaxError::new(
                format!("number '{}' is out of range", text),
                start,
            )),
            Err(_) => Err(FormulaSyntaxError::new(
                format!("malformed number '{}'", text),
                start,
            )),
        }
    }

    fn scan_cell(&mut self) -> Result<Token, FormulaSyntaxError> {
        let start = self.pos;
        while self.peek_char().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        self.consume_digits();
        while self.peek_char().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
            self.pos += 1;
        }

        let name = &self.input[start..self.pos];
        Position::from_str(name)
            .map(Token::Cell)
            .ok_or_else(|| FormulaSyntaxError::new(format!("invalid cell reference '{}'", name), start))
    }

    fn consume_digits(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Expr {
        Expr::Number(n)
    }

    fn cell(name: &str) -> Expr {
        Expr::Cell(Position::from_str(name).unwrap())
    }

    #[test]
    fn test_parse_precedence() {
        assert_eq!(
            parse_expression("1+2*3").unwrap(),
            Expr::binary(
                BinaryOp::Add,
                num(1.0),
                Expr::binary(BinaryOp::Multiply, num(2.0), num(3.0))
            )
        );
    }

    #[test]
    fn test_parse_left_associative() {
        assert_eq!(
            parse_expression("8-4-2").unwrap(),
            Expr::binary(
                BinaryOp::Subtract,
                Expr::binary(BinaryOp::Subtract, num(8.0), num(4.0)),
                num(2.0)
            )
        );
    }

    #[test]
    fn test_parse_unary_and_parens() {
        assert_eq!(
            parse_expression("-(A1 + 2)").unwrap(),
            Expr::unary(
                UnaryOp::Minus,
                Expr::binary(BinaryOp::Add, cell("A1"), num(2.0))
            )
        );
        assert_eq!(
            parse_expression("2*-B3").unwrap(),
            Expr::binary(
                BinaryOp::Multiply,
                num(2.0),
                Expr::unary(UnaryOp::Minus, cell("B3"))
            )
        );
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_expression("1.5").unwrap(), num(1.5));
        assert_eq!(parse_expression(".5").unwrap(), num(0.5));
        assert_eq!(parse_expression("2e3").unwrap(), num(2000.0));
        assert_eq!(parse_expression("2E-1").unwrap(), num(0.2));
    }

    #[test]
    fn test_parse_cells_case_insensitive() {
        assert_eq!(parse_expression("aa10").unwrap(), cell("AA10"));
    }

    #[test]
    fn test_parse_errors() {
        for bad in [
            "", "   ", "1+", "(1", "1)", "1 2", "A", "A0", "A1B", "1..2", "2E", "1e999", "1 $ 2",
            "SUM(A1)",
        ] {
            assert!(parse_expression(bad).is_err(), "{:?} should not parse", bad);
        }
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |n: usize| format!("{}1{}", "(".repeat(n), ")".repeat(n));
        assert_eq!(parse_expression(&nested(MAX_NESTING)).unwrap(), num(1.0));
        for n in [MAX_NESTING + 1, 1000, 50_000] {
            let err = parse_expression(&nested(n)).unwrap_err();
            assert_eq!(err.message, "formula nested too deeply");
            assert_eq!(err.offset, MAX_NESTING);
        }

        assert!(parse_expression(&format!("{}1", "-".repeat(MAX_NESTING))).is_ok());
        let err = parse_expression(&format!("{}1", "-".repeat(100_000))).unwrap_err();
        assert_eq!(err.message, "formula nested too deeply");
    }

    #[test]
    fn test_height_limit_on_long_chains() {
        let chain = |n: usize| vec!["A1"; n].join("+");
        assert!(parse_expression(&chain(MAX_HEIGHT)).is_ok());
        let err = parse_expression(&chain(100_000)).unwrap_err();
        assert_eq!(err.message, "formula too long");
    }

    #[test]
    fn test_error_offset_points_at_token() {
        let err = parse_expression("1 + )").unwrap_err();
        assert_eq!(err.offset, 4);
        let err = parse_expression("1 + #").unwrap_err();
        assert_eq!(err.offset, 4);
    }
}
