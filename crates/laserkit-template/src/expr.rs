//! Template expressions
//!
//! The sandboxed language inside `{...}` placeholders: numbers, identifiers,
//! `+ - * /`, parentheses and unary minus, with `;`-separated statements
//! where `name = expr` binds a local. The value of the final statement is the
//! result. The only free symbol is `thickness`.
//!
//! Parsing uses precedence climbing.

use std::collections::HashMap;
use std::fmt;

use laserkit_path::scan_number;

use crate::error::{TemplateError, TemplateResult};

pub const THICKNESS: &str = "thickness";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    fn precedence(self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mul | BinOp::Div => 2,
        }
    }

    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinOp::Add => lhs + rhs,
            BinOp::Sub => lhs - rhs,
            BinOp::Mul => lhs * rhs,
            BinOp::Div => lhs / rhs,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Symbol(String),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    fn eval(&self, scope: &HashMap<&str, f64>) -> TemplateResult<f64> {
        match self {
            Expr::Number(n) => Ok(*n),
            Expr::Symbol(name) => scope
                .get(name.as_str())
                .copied()
                .ok_or_else(|| TemplateError::UnknownSymbol(name.clone())),
            Expr::Neg(inner) => Ok(-inner.eval(scope)?),
            Expr::Binary(op, lhs, rhs) => Ok(op.apply(lhs.eval(scope)?, rhs.eval(scope)?)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assign(String, Expr),
    Expr(Expr),
}

/// A parsed placeholder body.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    source: String,
    statements: Vec<Statement>,
}

impl Program {
    pub fn parse(source: &str) -> TemplateResult<Self> {
        let parse_error = |reason: String| TemplateError::Parse {
            input: source.to_string(),
            reason,
        };

        let tokens = tokenize(source).map_err(parse_error)?;
        let mut parser = Parser { tokens, pos: 0 };
        let mut statements = Vec::new();

        loop {
            while parser.peek() == &Token::Semi {
                parser.advance();
            }
            if parser.peek() == &Token::End {
                break;
            }
            statements.push(parser.parse_statement().map_err(parse_error)?);
            match parser.peek() {
                Token::Semi | Token::End => {}
                other => return Err(parse_error(format!("unexpected token {}", other))),
            }
        }

        if statements.is_empty() {
            return Err(parse_error("empty expression".to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            statements,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn evaluate(&self, thickness: f64) -> TemplateResult<f64> {
        let mut scope: HashMap<&str, f64> = HashMap::new();
        scope.insert(THICKNESS, thickness);

        let mut result = f64::NAN;
        for statement in &self.statements {
            result = match statement {
                Statement::Assign(name, expr) => {
                    let value = expr.eval(&scope)?;
                    scope.insert(name.as_str(), value);
                    value
                }
                Statement::Expr(expr) => expr.eval(&scope)?,
            };
        }

        if result.is_finite() {
            Ok(result)
        } else {
            Err(TemplateError::NonFinite {
                expression: self.source.clone(),
            })
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Op(BinOp),
    Minus,
    LParen,
    RParen,
    Assign,
    Semi,
    End,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Num(n) => write!(f, "{}", n),
            Token::Ident(name) => write!(f, "'{}'", name),
            Token::Op(BinOp::Add) => f.write_str("'+'"),
            Token::Op(BinOp::Sub) | Token::Minus => f.write_str("'-'"),
            Token::Op(BinOp::Mul) => f.write_str("'*'"),
            Token::Op(BinOp::Div) => f.write_str("'/'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::Assign => f.write_str("'='"),
            Token::Semi => f.write_str("';'"),
            Token::End => f.write_str("end of expression"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(&b) = bytes.get(pos) {
        match b {
            b' ' | b'\t' | b'\n' | b'\r' => pos += 1,
            b'0'..=b'9' | b'.' => {
                let (value, end) = scan_number(bytes, pos)
                    .ok_or_else(|| format!("invalid number at offset {}", pos))?;
                tokens.push(Token::Num(value));
                pos = end;
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                let start = pos;
                while bytes
                    .get(pos)
                    .is_some_and(|c| c.is_ascii_alphanumeric() || *c == b'_')
                {
                    pos += 1;
                }
                tokens.push(Token::Ident(input[start..pos].to_string()));
            }
            _ => {
                let token = match b {
                    b'+' => Token::Op(BinOp::Add),
                    b'-' => Token::Minus,
                    b'*' => Token::Op(BinOp::Mul),
                    b'/' => Token::Op(BinOp::Div),
                    b'(' => Token::LParen,
                    b')' => Token::RParen,
                    b'=' => Token::Assign,
                    b';' => Token::Semi,
                    _ => {
                        return Err(format!(
                            "unexpected character '{}' at offset {}",
                            input[pos..].chars().next().unwrap_or('?'),
                            pos
                        ))
                    }
                };
                tokens.push(token);
                pos += 1;
            }
        }
    }

    tokens.push(Token::End);
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::End)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or(&Token::End)
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn parse_statement(&mut self) -> Result<Statement, String> {
        // Declarations written as `let x = ...` or `var x = ...`
        let declaration = matches!(
            self.peek(),
            Token::Ident(word) if matches!(word.as_str(), "let" | "var" | "const")
        ) && matches!(self.peek_at(1), Token::Ident(_));
        if declaration {
            self.advance();
        }

        if let Token::Ident(name) = self.peek().clone() {
            if self.peek_at(1) == &Token::Assign {
                if name == THICKNESS {
                    return Err("cannot assign to 'thickness'".to_string());
                }
                self.advance();
                self.advance();
                return Ok(Statement::Assign(name, self.parse_expr(0)?));
            }
        }

        Ok(Statement::Expr(self.parse_expr(0)?))
    }

    fn parse_expr(&mut self, min_prec: u8) -> Result<Expr, String> {
        let mut left = self.parse_atom()?;

        loop {
            let op = match self.peek() {
                Token::Op(op) => *op,
                Token::Minus => BinOp::Sub,
                _ => break,
            };

            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.advance();

            // All operators are left associative
            let right = self.parse_expr(prec + 1)?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    fn parse_atom(&mut self) -> Result<Expr, String> {
        match self.advance() {
            Token::Num(n) => Ok(Expr::Number(n)),
            Token::Ident(name) => Ok(Expr::Symbol(name)),
            Token::LParen => {
                let expr = self.parse_expr(0)?;
                if self.advance() != Token::RParen {
                    return Err("expected ')'".to_string());
                }
                Ok(expr)
            }
            Token::Minus => Ok(Expr::Neg(Box::new(self.parse_atom()?))),
            Token::Op(BinOp::Add) => self.parse_atom(),
            other => Err(format!("unexpected {}", other)),
        }
    }
}
