//! # LaserKit Path
//!
//! SVG path command model: parsing, serialization, normalization (including
//! arc to cubic conversion) and the edge a path spans.

pub mod arc;
pub mod command;
pub mod edge;
pub mod error;
pub mod normalize;
pub mod parser;

pub use arc::{arc_to_cubics, ArcSegment};
pub use command::{end_points, format_number, serialize, Params, PathCommand, Pen, Position, Verb};
pub use edge::Edge;
pub use error::{PathError, PathResult};
pub use normalize::{normalize, to_absolute, to_relative, NormalizeOptions};
pub use parser::{parse, scan_number};
