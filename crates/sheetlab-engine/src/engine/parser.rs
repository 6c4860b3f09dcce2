//! Recursive-descent parser for `=` formulas.
//!
//! The accepted language is deliberately small:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := '-' unary | primary
//! primary := NUMBER | CELL | 'SUM' '(' CELL ':' CELL ')' | '(' expr ')'
//! ```
//!
//! Anything outside it is a [`ParseError`]; nothing is ever skipped.

use thiserror::Error;

use super::cell_ref::{CellId, GridBounds};

/// Parsed formula expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    Ref(CellId),
    /// Sum over the rectangle `start..=end`, corners taken literally.
    Sum { start: CellId, end: CellId },
    Neg(Box<Expr>),
    Binary {
        op: Op,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),

    #[error("unexpected end of formula")]
    UnexpectedEnd,

    #[error("unexpected token {0}")]
    UnexpectedToken(String),

    #[error("only one SUM call is allowed per formula")]
    MultipleSums,

    #[error("formula nests deeper than {MAX_NESTING} levels")]
    TooDeep,

    #[error("formula is longer than {MAX_FORMULA_LEN} bytes")]
    TooLong,
}

/// Longest formula body the parser accepts.
pub const MAX_FORMULA_LEN: usize = 4096;

/// Limit on nested parentheses and unary minus chains.
pub const MAX_NESTING: usize = 64;

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Cell(CellId),
    Sum,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Colon,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::Cell(id) => format!("reference {}", id),
            Token::Sum => "SUM".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Colon => "':'".to_string(),
        }
    }
}

/// Parse the body of a formula (the text after `=`).
pub fn parse(body: &str, bounds: &GridBounds) -> Result<Expr, ParseError> {
    if body.len() > MAX_FORMULA_LEN {
        return Err(ParseError::TooLong);
    }
    let tokens = tokenize(&body.to_ascii_uppercase(), bounds)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        sums: 0,
        depth: 0,
    };
    let expr = parser.parse_expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(tok) => Err(ParseError::UnexpectedToken(tok.describe())),
    }
}

fn tokenize(input: &str, bounds: &GridBounds) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '+' => {
                tokens.push(Token::Plus);
                chars.next();
            }
            '-' => {
                tokens.push(Token::Minus);
                chars.next();
            }
            '*' => {
                tokens.push(Token::Star);
                chars.next();
            }
            '/' => {
                tokens.push(Token::Slash);
                chars.next();
            }
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            ':' => {
                tokens.push(Token::Colon);
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let n = super::eval::parse_decimal(&literal)
                    .ok_or(ParseError::InvalidNumber(literal))?;
                tokens.push(Token::Number(n));
            }
            c if c.is_ascii_alphabetic() => {
                let mut word = String::new();
                while let Some(&(_, w)) = chars.peek() {
                    if w.is_ascii_alphanumeric() {
                        word.push(w);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if word == "SUM" {
                    tokens.push(Token::Sum);
                } else {
                    let cell = CellId::parse(&word, bounds)
                        .ok_or(ParseError::UnknownIdentifier(word))?;
                    tokens.push(Token::Cell(cell));
                }
            }
            _ => return Err(ParseError::UnexpectedChar { ch: c, pos }),
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    sums: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<&Token, ParseError> {
        let tok = self.tokens.get(self.pos).ok_or(ParseError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(tok)
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        let tok = self.next()?;
        if *tok == expected {
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken(tok.describe()))
        }
    }

    fn expect_cell(&mut self) -> Result<CellId, ParseError> {
        match self.next()? {
            Token::Cell(id) => Ok(*id),
            other => Err(ParseError::UnexpectedToken(other.describe())),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => Op::Add,
                Some(Token::Minus) => Op::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_term()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => Op::Mul,
                Some(Token::Slash) => Op::Div,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ParseError::TooDeep);
        }
        let result = if let Some(Token::Minus) = self.peek() {
            self.pos += 1;
            self.parse_unary().map(|operand| Expr::Neg(Box::new(operand)))
        } else {
            self.parse_primary()
        };
        self.depth -= 1;
        result
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.next()?.clone() {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Cell(id) => Ok(Expr::Ref(id)),
            Token::Sum => {
                self.sums += 1;
                if self.sums > 1 {
                    return Err(ParseError::MultipleSums);
                }
                self.expect(Token::LParen)?;
                let start = self.expect_cell()?;
                self.expect(Token::Colon)?;
                let end = self.expect_cell()?;
                self.expect(Token::RParen)?;
                Ok(Expr::Sum { start, end })
            }
            Token::LParen => {
                let inner = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            other => Err(ParseError::UnexpectedToken(other.describe())),
        }
    }
}
