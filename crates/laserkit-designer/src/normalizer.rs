//! Rectangle to edge paths
//!
//! A rectangle whose sides carry joint annotations is replaced by four
//! single-segment paths so every side can get its own joint. The sides are
//! traced counter-clockwise on screen (top right to left, right bottom to
//! top, bottom left to right, left top to bottom), which puts every edge
//! normal on the outside of the rectangle.

use laserkit_path::{PathCommand, Position};
use laserkit_template::Template;

use crate::annotations::{ShapeAnnotations, Side};
use crate::shape::{Geometry, Shape};

fn side_path(side: Side, x: f64, y: f64, w: f64, h: f64) -> Vec<PathCommand> {
    let (start, delta) = match side {
        Side::Top => ((x + w, y), (-w, 0.0)),
        Side::Right => ((x + w, y + h), (0.0, -h)),
        Side::Bottom => ((x, y + h), (w, 0.0)),
        Side::Left => ((x, y), (0.0, h)),
    };
    vec![
        PathCommand::move_to(Position::Absolute, start.0, start.1),
        PathCommand::line_to(Position::Relative, delta.0, delta.1),
    ]
}

/// Split a rectangle into its top, right, bottom and left edges.
///
/// Each edge takes over the joint annotations of its side as plain
/// `joint`, `joint-type` and `joint-direction`, and a literal template of
/// its own path data. Presentation attributes are copied; an element id
/// gets the side name appended. Returns `None` for anything but a
/// rectangle.
pub fn normalize_rect(shape: &Shape) -> Option<[Shape; 4]> {
    let rect = shape.geometry.as_rect()?;

    Some(Side::ALL.map(|side| {
        let commands = side_path(side, rect.x, rect.y, rect.width, rect.height);
        let mut edge = Shape::new(Geometry::Path(commands.clone()));
        edge.template = Some(Template::from_path(&commands));
        edge.annotations = ShapeAnnotations {
            thickness: shape.annotations.thickness,
            joint: shape.annotations.side(side).clone(),
            ..ShapeAnnotations::default()
        };
        edge.attributes = shape.attributes.clone();
        if let Some(id) = shape.element_id() {
            edge.attributes
                .insert("id".to_string(), format!("{}-{}", id, side));
        }
        edge
    }))
}
