//! Segment highlights
//!
//! Overlays drawn on top of the document while editing: the selected
//! segment of a path, and every edge whose length matches a given value
//! (candidates for a thickness dependency). Highlights are kept beside the
//! document and never end up in saved or exported output.

use laserkit_core::Point;
use laserkit_path::{end_points, format_number, PathCommand, Position};
use laserkit_template::{to_template, ParamMark, Template};
use std::collections::BTreeMap;

use crate::document::{Element, Node};
use crate::shape::{Geometry, Shape, ShapeId};

pub const LENGTH_HIGHLIGHT_CLASS: &str = "lengthHighlight";

/// Path segments within this distance of the requested length match.
pub const SEGMENT_LENGTH_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightTarget {
    /// Top or bottom side of a rectangle
    Width,
    /// Left or right side of a rectangle
    Height,
    /// Segment ending at this command index
    Segment(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    pub shape: ShapeId,
    pub class: String,
    pub target: HighlightTarget,
    pub start: Point,
    pub end: Point,
    /// The segment as a thickness template, offered to the user
    pub template: Option<Template>,
}

impl Highlight {
    pub fn to_node(&self, prefix: &str) -> Node {
        let mut attributes = BTreeMap::new();
        attributes.insert("class".to_string(), self.class.clone());
        attributes.insert(
            "d".to_string(),
            format!(
                "M {} {} L {} {}",
                format_number(self.start.x),
                format_number(self.start.y),
                format_number(self.end.x),
                format_number(self.end.y)
            ),
        );
        if let Some(template) = &self.template {
            attributes.insert(format!("{}:template", prefix), template.to_string());
        }
        Node::Element(Element {
            name: "path".to_string(),
            attributes,
            children: Vec::new(),
        })
    }
}

/// Highlight the segment of a path that ends at command `index`.
///
/// `None` for non-paths, `index == 0` (the initial move) and indices past
/// the end.
pub fn segment_highlight(shape: &Shape, index: usize, tag: &str) -> Option<Highlight> {
    let points = end_points(shape.path()?);
    if index == 0 || index >= points.len() {
        return None;
    }
    Some(Highlight {
        shape: shape.id,
        class: format!("pathHighlight-{}", tag),
        target: HighlightTarget::Segment(index),
        start: points[index - 1],
        end: points[index],
        template: None,
    })
}

fn length_highlight(
    shape: &Shape,
    target: HighlightTarget,
    start: Point,
    end: Point,
    thickness: f64,
) -> Highlight {
    let delta = end - start;
    let segment = [
        PathCommand::move_to(Position::Absolute, start.x, start.y),
        PathCommand::line_to(Position::Relative, delta.x, delta.y),
    ];
    let marks = [ParamMark::new(1, 0), ParamMark::new(1, 1)];
    let template = match to_template(&segment, &marks, thickness) {
        Ok(template) => Some(template),
        Err(e) => {
            tracing::warn!("Highlight on {} carries no template: {}", shape.label(), e);
            None
        }
    };
    Highlight {
        shape: shape.id,
        class: LENGTH_HIGHLIGHT_CLASS.to_string(),
        target,
        start,
        end,
        template,
    }
}

/// Highlight every side or segment of `shape` that is `length` long.
pub fn length_highlights(shape: &Shape, length: f64, thickness: f64) -> Vec<Highlight> {
    let mut out = Vec::new();
    match &shape.geometry {
        Geometry::Rect(r) => {
            if (r.width - length).abs() < 1e-9 {
                for y in [r.y, r.y + r.height] {
                    out.push(length_highlight(
                        shape,
                        HighlightTarget::Width,
                        Point::new(r.x, y),
                        Point::new(r.x + length, y),
                        thickness,
                    ));
                }
            }
            if (r.height - length).abs() < 1e-9 {
                for x in [r.x, r.x + r.width] {
                    out.push(length_highlight(
                        shape,
                        HighlightTarget::Height,
                        Point::new(x, r.y),
                        Point::new(x, r.y + length),
                        thickness,
                    ));
                }
            }
        }
        Geometry::Path(commands) => {
            let points = end_points(commands);
            for (index, pair) in points.windows(2).enumerate() {
                let (start, end) = (pair[0], pair[1]);
                if (start.distance_to(&end) - length).abs() < SEGMENT_LENGTH_TOLERANCE {
                    out.push(length_highlight(
                        shape,
                        HighlightTarget::Segment(index + 1),
                        start,
                        end,
                        thickness,
                    ));
                }
            }
        }
        Geometry::Circle { .. } | Geometry::Ellipse { .. } => {}
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Rect;
    use laserkit_path::parse;

    fn path(data: &str) -> Shape {
        Shape::new(Geometry::Path(parse(data).unwrap()))
    }

    #[test]
    fn test_segment_highlight_points() {
        let shape = path("M 10 10 l 20 0 l 0 5 z");
        let h = segment_highlight(&shape, 2, "pathTemplate").unwrap();
        assert_eq!(h.class, "pathHighlight-pathTemplate");
        assert_eq!((h.start, h.end), (Point::new(30.0, 10.0), Point::new(30.0, 15.0)));

        let close = segment_highlight(&shape, 3, "kerfMask").unwrap();
        assert_eq!(close.end, Point::new(10.0, 10.0));

        assert!(segment_highlight(&shape, 0, "x").is_none());
        assert!(segment_highlight(&shape, 4, "x").is_none());
    }

    #[test]
    fn test_overlay_node() {
        let shape = path("M 0 0 l 4 0");
        let node = segment_highlight(&shape, 1, "sel").unwrap().to_node("laser");
        let Node::Element(element) = node else {
            panic!("expected an element");
        };
        assert_eq!(element.attributes["d"], "M 0 0 L 4 0");
        assert_eq!(element.attributes["class"], "pathHighlight-sel");
    }

    #[test]
    fn test_rect_sides_with_length() {
        let shape = Shape::new(Geometry::Rect(Rect::new(0.0, 0.0, 3.0, 3.0)));
        let found = length_highlights(&shape, 3.0, 3.0);
        assert_eq!(found.len(), 4);
        assert_eq!(found[0].target, HighlightTarget::Width);
        assert_eq!(found[3].start, Point::new(3.0, 0.0));
        assert_eq!(
            found[2].template.as_ref().unwrap().to_string(),
            "M 0 0 l 0 {thickness}"
        );
    }

    #[test]
    fn test_path_segments_within_tolerance() {
        let shape = path("M 0 0 l 3.2 0 l 0 10 l -6 0");
        let found = length_highlights(&shape, 3.0, 3.0);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].target, HighlightTarget::Segment(1));
        assert_eq!(found[0].class, LENGTH_HIGHLIGHT_CLASS);

        let found = length_highlights(&shape, 6.0, 3.0);
        assert_eq!(
            found[0].template.as_ref().unwrap().to_string(),
            "M 3.2 10 l {-2*thickness} 0"
        );
    }
}
