//! The straight edge spanned by a path.

use laserkit_core::Point;

use crate::command::{end_points, PathCommand};

/// Vector from the end of a path's first command to the end of its last.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub start: Point,
    pub end: Point,
    pub width: f64,
    pub height: f64,
    /// `atan2(height, width)` in radians
    pub angle: f64,
    pub length: f64,
    /// Unit vector along the edge; zero for a zero-length edge.
    pub direction: Point,
    /// `direction` rotated by +90 degrees.
    pub normal: Point,
}

impl Edge {
    pub fn new(start: Point, end: Point) -> Self {
        let delta = end - start;
        let direction = delta.normalized().unwrap_or(Point::ORIGIN);
        Self {
            start,
            end,
            width: delta.x,
            height: delta.y,
            angle: delta.y.atan2(delta.x),
            length: delta.length(),
            direction,
            normal: direction.perpendicular(),
        }
    }

    /// `None` when the path has fewer than two commands.
    pub fn from_commands(commands: &[PathCommand]) -> Option<Self> {
        if commands.len() < 2 {
            return None;
        }
        let points = end_points(commands);
        Some(Self::new(*points.first()?, *points.last()?))
    }

    pub fn vector(&self) -> Point {
        self.end - self.start
    }

    pub fn is_degenerate(&self) -> bool {
        self.length <= f64::EPSILON
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.start * factor, self.end * factor)
    }
}
