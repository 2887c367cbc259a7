//! Path templates
//!
//! A template has the same commands as the path it describes, but each
//! parameter is either a literal or a `{...}` expression of the material
//! thickness, optionally negated as `-{...}`. Templates are stored as a
//! single string, e.g. `M 0 0 l {thickness} 0 l 0 -{thickness}`.

use smallvec::SmallVec;
use std::fmt;

use laserkit_path::{format_number, scan_number, PathCommand, Position, Verb};

use crate::error::{TemplateError, TemplateResult};
use crate::expr::Program;

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateParam {
    Literal(f64),
    Symbolic {
        negated: bool,
        source: String,
        program: Program,
    },
}

impl TemplateParam {
    pub fn symbolic(source: &str) -> TemplateResult<Self> {
        Ok(TemplateParam::Symbolic {
            negated: false,
            source: source.to_string(),
            program: Program::parse(source)?,
        })
    }

    pub fn negated(self) -> Self {
        match self {
            TemplateParam::Literal(v) => TemplateParam::Literal(-v),
            TemplateParam::Symbolic {
                negated,
                source,
                program,
            } => TemplateParam::Symbolic {
                negated: !negated,
                source,
                program,
            },
        }
    }

    pub fn is_symbolic(&self) -> bool {
        matches!(self, TemplateParam::Symbolic { .. })
    }

    pub fn evaluate(&self, thickness: f64) -> TemplateResult<f64> {
        match self {
            TemplateParam::Literal(v) => Ok(*v),
            TemplateParam::Symbolic {
                negated, program, ..
            } => {
                let value = program.evaluate(thickness)?;
                Ok(if *negated { -value } else { value })
            }
        }
    }
}

impl fmt::Display for TemplateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateParam::Literal(v) => f.write_str(&format_number(*v)),
            TemplateParam::Symbolic {
                negated, source, ..
            } => write!(f, "{}{{{}}}", if *negated { "-" } else { "" }, source),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateCommand {
    pub verb: Verb,
    pub position: Position,
    pub params: SmallVec<[TemplateParam; 7]>,
}

impl fmt::Display for TemplateCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.verb.letter(self.position))?;
        for param in &self.params {
            write!(f, " {}", param)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    commands: Vec<TemplateCommand>,
}

impl Template {
    /// A template with every parameter literal.
    pub fn from_path(path: &[PathCommand]) -> Self {
        let commands = path
            .iter()
            .map(|cmd| TemplateCommand {
                verb: cmd.verb,
                position: cmd.position,
                params: cmd.params.iter().map(|v| TemplateParam::Literal(*v)).collect(),
            })
            .collect();
        Self { commands }
    }

    pub fn from_commands(commands: Vec<TemplateCommand>) -> Self {
        Self { commands }
    }

    pub fn commands(&self) -> &[TemplateCommand] {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut [TemplateCommand] {
        &mut self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Whether any parameter depends on the thickness.
    pub fn is_parametric(&self) -> bool {
        self.commands
            .iter()
            .any(|c| c.params.iter().any(TemplateParam::is_symbolic))
    }

    pub fn parse(input: &str) -> TemplateResult<Self> {
        let mut lexer = TemplateLexer {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        };
        let mut commands = Vec::new();

        lexer.skip_separators();
        if lexer.at_end() {
            return Err(lexer.error("empty template"));
        }

        while !lexer.at_end() {
            let letter = lexer.bytes[lexer.pos] as char;
            let (verb, position) = Verb::from_letter(letter)
                .ok_or_else(|| lexer.error(&format!("unknown command '{}'", letter)))?;
            lexer.pos += 1;

            let mut current = verb;
            loop {
                let mut params = SmallVec::new();
                for index in 0..current.arity() {
                    lexer.skip_separators();
                    match lexer.next_param(current.is_flag(index))? {
                        Some(param) => params.push(param),
                        None => {
                            return Err(TemplateError::Shape {
                                command: current.letter(position),
                                expected: current.arity(),
                                found: index,
                            })
                        }
                    }
                }
                commands.push(TemplateCommand {
                    verb: current,
                    position,
                    params,
                });

                lexer.skip_separators();
                if current == Verb::Close || !lexer.at_param() {
                    break;
                }
                if current == Verb::Move {
                    current = Verb::Line;
                }
            }
        }

        Ok(Self { commands })
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, command) in self.commands.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", command)?;
        }
        Ok(())
    }
}

struct TemplateLexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl TemplateLexer<'_> {
    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_separators(&mut self) {
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_whitespace() || b == b',')
        {
            self.pos += 1;
        }
    }

    fn at_param(&self) -> bool {
        matches!(self.peek(), Some(b'0'..=b'9' | b'.' | b'-' | b'+' | b'{'))
    }

    fn error(&self, reason: &str) -> TemplateError {
        TemplateError::Parse {
            input: self.input.to_string(),
            reason: format!("{} at offset {}", reason, self.pos),
        }
    }

    /// Next parameter, or `None` when the next token is a command or the end.
    fn next_param(&mut self, flag: bool) -> TemplateResult<Option<TemplateParam>> {
        if !self.at_param() {
            return Ok(None);
        }

        if flag {
            return match self.peek() {
                Some(b @ (b'0' | b'1')) => {
                    self.pos += 1;
                    Ok(Some(TemplateParam::Literal(f64::from(b - b'0'))))
                }
                _ => Err(self.error("expected arc flag 0 or 1")),
            };
        }

        let negated = self.peek() == Some(b'-') && self.bytes.get(self.pos + 1) == Some(&b'{');
        if negated {
            self.pos += 1;
        }

        if self.peek() == Some(b'{') {
            let open = self.pos;
            let close = self.input[open..]
                .find('}')
                .map(|i| open + i)
                .ok_or_else(|| self.error("unterminated '{'"))?;
            let source = self.input[open + 1..close].trim();
            self.pos = close + 1;
            let param = TemplateParam::symbolic(source)?;
            return Ok(Some(if negated { param.negated() } else { param }));
        }

        let (value, end) =
            scan_number(self.bytes, self.pos).ok_or_else(|| self.error("expected a number"))?;
        self.pos = end;
        Ok(Some(TemplateParam::Literal(value)))
    }
}
