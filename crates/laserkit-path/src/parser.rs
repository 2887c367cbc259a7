//! Path data parser
//!
//! Handles comma/whitespace separation, signs glued to the previous number
//! (`10-5`), a second decimal point starting a new number (`0.5.5`),
//! exponents, implicit command repetition and compact arc flags
//! (`a1 1 0 01 5 5`).

use crate::command::{PathCommand, Position, Verb};
use crate::error::{PathError, PathResult};

/// Parse SVG path data into commands.
pub fn parse(data: &str) -> PathResult<Vec<PathCommand>> {
    let mut lexer = Lexer::new(data);
    let mut commands: Vec<PathCommand> = Vec::new();

    lexer.skip_separators();
    if lexer.at_end() {
        return Err(PathError::InvalidPath("empty path data".to_string()));
    }

    while !lexer.at_end() {
        let offset = lexer.pos;
        let letter = lexer.next_char().unwrap_or_default();
        if !letter.is_ascii_alphabetic() {
            return Err(lexer.malformed(offset, format!("expected a command, found '{}'", letter)));
        }
        let (verb, position) = Verb::from_letter(letter)
            .ok_or_else(|| lexer.malformed(offset, format!("unknown command '{}'", letter)))?;

        if commands.is_empty() && verb != Verb::Move {
            return Err(PathError::InvalidPath(format!(
                "path must start with a move, found '{}'",
                letter
            )));
        }

        if verb == Verb::Close {
            commands.extend(PathCommand::new(verb, position, &[]));
            lexer.skip_separators();
            continue;
        }

        // Extra parameter groups repeat the command; after a move they are lines.
        let mut current = verb;
        loop {
            let mut params = [0.0f64; 7];
            for (index, slot) in params.iter_mut().enumerate().take(current.arity()) {
                lexer.skip_separators();
                *slot = if current.is_flag(index) {
                    lexer.next_flag()?
                } else {
                    lexer.next_number()?
                };
            }
            if let Some(cmd) = PathCommand::new(current, position, &params[..current.arity()]) {
                commands.push(cmd);
            }

            lexer.skip_separators();
            if !lexer.at_number() {
                break;
            }
            if current == Verb::Move {
                current = Verb::Line;
            }
        }
    }

    tracing::trace!("Parsed {} path commands", commands.len());
    Ok(commands)
}

struct Lexer<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(data: &'a str) -> Self {
        Self {
            bytes: data.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek()? as char;
        self.pos += 1;
        Some(c)
    }

    fn skip_separators(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() || b == b',' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn at_number(&self) -> bool {
        matches!(self.peek(), Some(b'0'..=b'9' | b'.' | b'-' | b'+'))
    }

    fn malformed(&self, position: usize, reason: String) -> PathError {
        PathError::Malformed { position, reason }
    }

    fn next_flag(&mut self) -> PathResult<f64> {
        let start = self.pos;
        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                Ok(0.0)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(1.0)
            }
            _ => Err(self.malformed(start, "expected arc flag 0 or 1".to_string())),
        }
    }

    fn next_number(&mut self) -> PathResult<f64> {
        let start = self.pos;
        let (value, end) = scan_number(self.bytes, start)
            .ok_or_else(|| self.malformed(start, "expected a number".to_string()))?;
        self.pos = end;
        Ok(value)
    }
}

/// Scan one number starting at byte offset `start`.
///
/// Returns the value and the offset just past it. The scan stops at a second
/// decimal point or a sign that is not part of an exponent, so `0.5.5` and
/// `10-5` each yield two numbers.
pub fn scan_number(bytes: &[u8], start: usize) -> Option<(f64, usize)> {
    let at = |i: usize| bytes.get(i).copied();
    let mut pos = start;
    if matches!(at(pos), Some(b'-' | b'+')) {
        pos += 1;
    }

    let mut digits = 0;
    while matches!(at(pos), Some(b'0'..=b'9')) {
        pos += 1;
        digits += 1;
    }
    if at(pos) == Some(b'.') {
        pos += 1;
        while matches!(at(pos), Some(b'0'..=b'9')) {
            pos += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(at(pos), Some(b'e' | b'E')) {
        let mut exp = pos + 1;
        if matches!(at(exp), Some(b'-' | b'+')) {
            exp += 1;
        }
        if matches!(at(exp), Some(b'0'..=b'9')) {
            while matches!(at(exp), Some(b'0'..=b'9')) {
                exp += 1;
            }
            pos = exp;
        }
    }

    let text = std::str::from_utf8(&bytes[start..pos]).ok()?;
    text.parse::<f64>().ok().map(|value| (value, pos))
}
