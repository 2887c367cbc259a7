//! Path commands
//!
//! A path is a sequence of [`PathCommand`]s, each a verb, an absolute or
//! relative position mode and a fixed number of parameters.

use smallvec::SmallVec;
use std::fmt;

use laserkit_core::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Move,
    Line,
    Horizontal,
    Vertical,
    Cubic,
    SmoothCubic,
    Quadratic,
    SmoothQuadratic,
    /// `rx ry x-rotation large-arc sweep x y`
    Arc,
    Close,
}

impl Verb {
    pub fn arity(self) -> usize {
        match self {
            Verb::Move | Verb::Line | Verb::SmoothQuadratic => 2,
            Verb::Horizontal | Verb::Vertical => 1,
            Verb::Cubic => 6,
            Verb::SmoothCubic | Verb::Quadratic => 4,
            Verb::Arc => 7,
            Verb::Close => 0,
        }
    }

    pub fn from_letter(letter: char) -> Option<(Verb, Position)> {
        let verb = match letter.to_ascii_uppercase() {
            'M' => Verb::Move,
            'L' => Verb::Line,
            'H' => Verb::Horizontal,
            'V' => Verb::Vertical,
            'C' => Verb::Cubic,
            'S' => Verb::SmoothCubic,
            'Q' => Verb::Quadratic,
            'T' => Verb::SmoothQuadratic,
            'A' => Verb::Arc,
            'Z' => Verb::Close,
            _ => return None,
        };
        let position = if letter.is_ascii_lowercase() {
            Position::Relative
        } else {
            Position::Absolute
        };
        Some((verb, position))
    }

    pub fn letter(self, position: Position) -> char {
        let upper = match self {
            Verb::Move => 'M',
            Verb::Line => 'L',
            Verb::Horizontal => 'H',
            Verb::Vertical => 'V',
            Verb::Cubic => 'C',
            Verb::SmoothCubic => 'S',
            Verb::Quadratic => 'Q',
            Verb::SmoothQuadratic => 'T',
            Verb::Arc => 'A',
            Verb::Close => 'Z',
        };
        match position {
            Position::Absolute => upper,
            Position::Relative => upper.to_ascii_lowercase(),
        }
    }

    /// Parameter indices that are arc flags rather than coordinates.
    pub fn is_flag(self, index: usize) -> bool {
        self == Verb::Arc && (index == 3 || index == 4)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Absolute,
    Relative,
}

pub type Params = SmallVec<[f64; 7]>;

#[derive(Debug, Clone, PartialEq)]
pub struct PathCommand {
    pub verb: Verb,
    pub position: Position,
    pub params: Params,
}

impl PathCommand {
    /// Build a command, returning `None` when the parameter count does not
    /// match the verb.
    pub fn new(verb: Verb, position: Position, params: &[f64]) -> Option<Self> {
        if params.len() != verb.arity() {
            return None;
        }
        Some(Self {
            verb,
            position,
            params: SmallVec::from_slice(params),
        })
    }

    pub fn move_to(position: Position, x: f64, y: f64) -> Self {
        Self::from_array(Verb::Move, position, [x, y])
    }

    pub fn line_to(position: Position, x: f64, y: f64) -> Self {
        Self::from_array(Verb::Line, position, [x, y])
    }

    pub fn cubic_to(position: Position, c1: Point, c2: Point, end: Point) -> Self {
        Self::from_array(
            Verb::Cubic,
            position,
            [c1.x, c1.y, c2.x, c2.y, end.x, end.y],
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn arc_to(
        position: Position,
        rx: f64,
        ry: f64,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    ) -> Self {
        Self::from_array(
            Verb::Arc,
            position,
            [
                rx,
                ry,
                rotation,
                if large_arc { 1.0 } else { 0.0 },
                if sweep { 1.0 } else { 0.0 },
                x,
                y,
            ],
        )
    }

    pub fn close() -> Self {
        Self {
            verb: Verb::Close,
            position: Position::Absolute,
            params: SmallVec::new(),
        }
    }

    fn from_array<const N: usize>(verb: Verb, position: Position, params: [f64; N]) -> Self {
        Self {
            verb,
            position,
            params: SmallVec::from_slice(&params),
        }
    }

    pub fn is_relative(&self) -> bool {
        self.position == Position::Relative
    }

    pub fn letter(&self) -> char {
        self.verb.letter(self.position)
    }

    /// The coordinate pair that ends this command, as written.
    pub fn target(&self) -> Option<Point> {
        let p = &self.params;
        match self.verb {
            Verb::Move | Verb::Line | Verb::SmoothQuadratic => Some(Point::new(p[0], p[1])),
            Verb::Cubic => Some(Point::new(p[4], p[5])),
            Verb::SmoothCubic | Verb::Quadratic => Some(Point::new(p[2], p[3])),
            Verb::Arc => Some(Point::new(p[5], p[6])),
            Verb::Horizontal | Verb::Vertical | Verb::Close => None,
        }
    }

    /// The pen position after this command, given the position before it and
    /// the start of the current subpath.
    pub fn end_point(&self, current: Point, subpath_start: Point) -> Point {
        let relative = self.is_relative();
        match self.verb {
            Verb::Close => subpath_start,
            Verb::Horizontal => {
                let x = self.params[0];
                Point::new(if relative { current.x + x } else { x }, current.y)
            }
            Verb::Vertical => {
                let y = self.params[0];
                Point::new(current.x, if relative { current.y + y } else { y })
            }
            _ => {
                let target = self.target().unwrap_or(current);
                if relative {
                    current + target
                } else {
                    target
                }
            }
        }
    }
}

impl fmt::Display for PathCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())?;
        for value in &self.params {
            write!(f, " {}", format_number(*value))?;
        }
        Ok(())
    }
}

/// Format a number with the shortest representation that parses back to the
/// same value. Negative zero is written as `0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

/// Serialize commands into SVG path data, e.g. `M 0 0 l 5 0 z`.
pub fn serialize(commands: &[PathCommand]) -> String {
    commands
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tracks the pen while walking a command list.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pen {
    pub current: Point,
    pub subpath_start: Point,
}

impl Pen {
    pub fn advance(&mut self, command: &PathCommand) -> Point {
        let end = command.end_point(self.current, self.subpath_start);
        if command.verb == Verb::Move {
            self.subpath_start = end;
        }
        self.current = end;
        end
    }
}

/// Absolute pen position after each command.
pub fn end_points(commands: &[PathCommand]) -> Vec<Point> {
    let mut pen = Pen::default();
    commands.iter().map(|c| pen.advance(c)).collect()
}
