//! Path normalization
//!
//! Converts commands to absolute coordinates and optionally reduces every
//! command to move, line, cubic and close.

use laserkit_core::Point;

use crate::arc::{arc_to_cubics, ArcSegment};
use crate::command::{PathCommand, Pen, Position, Verb};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub to_absolute: bool,
    /// Reduce to `M`, `L`, `C` and `Z` only.
    pub reduce_to_line_curve_only: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            to_absolute: true,
            reduce_to_line_curve_only: false,
        }
    }
}

pub fn normalize(commands: &[PathCommand], options: NormalizeOptions) -> Vec<PathCommand> {
    let absolute = if options.reduce_to_line_curve_only {
        reduce(commands)
    } else {
        to_absolute(commands)
    };

    if options.to_absolute {
        absolute
    } else {
        to_relative(&absolute)
    }
}

/// Rewrite every command with absolute coordinates, keeping its verb.
pub fn to_absolute(commands: &[PathCommand]) -> Vec<PathCommand> {
    let mut pen = Pen::default();
    let mut out = Vec::with_capacity(commands.len());

    for cmd in commands {
        let origin = pen.current;
        let mut abs = cmd.clone();
        abs.position = Position::Absolute;
        if cmd.is_relative() {
            match cmd.verb {
                Verb::Horizontal => abs.params[0] += origin.x,
                Verb::Vertical => abs.params[0] += origin.y,
                Verb::Arc => {
                    abs.params[5] += origin.x;
                    abs.params[6] += origin.y;
                }
                Verb::Close => {}
                _ => {
                    for pair in abs.params.chunks_mut(2) {
                        pair[0] += origin.x;
                        pair[1] += origin.y;
                    }
                }
            }
        }
        pen.advance(cmd);
        out.push(abs);
    }

    out
}

/// Rewrite every command relative to the pen position before it.
pub fn to_relative(commands: &[PathCommand]) -> Vec<PathCommand> {
    let mut pen = Pen::default();
    let mut out = Vec::with_capacity(commands.len());

    for cmd in commands {
        let origin = pen.current;
        let mut rel = cmd.clone();
        rel.position = Position::Relative;
        if !cmd.is_relative() {
            match cmd.verb {
                Verb::Horizontal => rel.params[0] -= origin.x,
                Verb::Vertical => rel.params[0] -= origin.y,
                Verb::Arc => {
                    rel.params[5] -= origin.x;
                    rel.params[6] -= origin.y;
                }
                Verb::Close => {}
                _ => {
                    for pair in rel.params.chunks_mut(2) {
                        pair[0] -= origin.x;
                        pair[1] -= origin.y;
                    }
                }
            }
        }
        pen.advance(cmd);
        out.push(rel);
    }

    out
}

fn reflect(control: Point, around: Point) -> Point {
    around * 2.0 - control
}

/// Absolute `M`/`L`/`C`/`Z` form.
fn reduce(commands: &[PathCommand]) -> Vec<PathCommand> {
    let mut out = Vec::with_capacity(commands.len());
    let mut pen = Pen::default();
    // Second control point of the previous cubic, control point of the
    // previous quadratic.
    let mut prev_cubic: Option<Point> = None;
    let mut prev_quad: Option<Point> = None;

    for cmd in to_absolute(commands) {
        let current = pen.current;
        let p = &cmd.params;
        let mut next_cubic = None;
        let mut next_quad = None;

        match cmd.verb {
            Verb::Move => out.push(PathCommand::move_to(Position::Absolute, p[0], p[1])),
            Verb::Line => out.push(PathCommand::line_to(Position::Absolute, p[0], p[1])),
            Verb::Horizontal => out.push(PathCommand::line_to(Position::Absolute, p[0], current.y)),
            Verb::Vertical => out.push(PathCommand::line_to(Position::Absolute, current.x, p[0])),
            Verb::Close => out.push(PathCommand::close()),
            Verb::Cubic => {
                let c2 = Point::new(p[2], p[3]);
                out.push(PathCommand::cubic_to(
                    Position::Absolute,
                    Point::new(p[0], p[1]),
                    c2,
                    Point::new(p[4], p[5]),
                ));
                next_cubic = Some(c2);
            }
            Verb::SmoothCubic => {
                let c1 = prev_cubic.map_or(current, |c| reflect(c, current));
                let c2 = Point::new(p[0], p[1]);
                out.push(PathCommand::cubic_to(
                    Position::Absolute,
                    c1,
                    c2,
                    Point::new(p[2], p[3]),
                ));
                next_cubic = Some(c2);
            }
            Verb::Quadratic | Verb::SmoothQuadratic => {
                let (control, end) = if cmd.verb == Verb::Quadratic {
                    (Point::new(p[0], p[1]), Point::new(p[2], p[3]))
                } else {
                    (
                        prev_quad.map_or(current, |c| reflect(c, current)),
                        Point::new(p[0], p[1]),
                    )
                };
                // Degree elevation
                let c1 = current + (control - current) * 2.0 / 3.0;
                let c2 = end + (control - end) * 2.0 / 3.0;
                out.push(PathCommand::cubic_to(Position::Absolute, c1, c2, end));
                next_quad = Some(control);
            }
            Verb::Arc => {
                let arc = ArcSegment {
                    from: current,
                    to: Point::new(p[5], p[6]),
                    rx: p[0],
                    ry: p[1],
                    rotation: p[2],
                    large_arc: p[3] != 0.0,
                    sweep: p[4] != 0.0,
                };
                if arc.rx.abs() < f64::EPSILON || arc.ry.abs() < f64::EPSILON {
                    out.push(PathCommand::line_to(Position::Absolute, arc.to.x, arc.to.y));
                } else {
                    for (c1, c2, end) in arc_to_cubics(&arc) {
                        out.push(PathCommand::cubic_to(Position::Absolute, c1, c2, end));
                    }
                }
            }
        }

        pen.advance(&cmd);
        prev_cubic = next_cubic;
        prev_quad = next_quad;
    }

    out
}
