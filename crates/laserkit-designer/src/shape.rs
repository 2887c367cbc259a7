//! Shapes
//!
//! A shape is an immutable value: its geometry, its fabrication annotations,
//! an optional thickness template and whatever other attributes the element
//! carried. Transform passes build new shapes and the document replaces them
//! by id.

use std::collections::BTreeMap;
use std::fmt;

use laserkit_core::Length;
use laserkit_joints::{JointDirection, JointKind};
use laserkit_path::{format_number, parse, serialize, PathCommand};
use laserkit_template::Template;
use uuid::Uuid;

use crate::annotations::ShapeAnnotations;
use crate::error::{DesignerError, DesignerResult};

/// Stable key of a shape within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(Uuid);

impl ShapeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ShapeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Corner radii
    pub rx: Option<f64>,
    pub ry: Option<f64>,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rx: None,
            ry: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Rect(Rect),
    Circle { cx: f64, cy: f64, r: f64 },
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64 },
    Path(Vec<PathCommand>),
}

impl Geometry {
    /// SVG element name.
    pub fn tag(&self) -> &'static str {
        match self {
            Geometry::Rect(_) => "rect",
            Geometry::Circle { .. } => "circle",
            Geometry::Ellipse { .. } => "ellipse",
            Geometry::Path(_) => "path",
        }
    }

    pub fn as_rect(&self) -> Option<&Rect> {
        match self {
            Geometry::Rect(rect) => Some(rect),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&[PathCommand]> {
        match self {
            Geometry::Path(commands) => Some(commands),
            _ => None,
        }
    }

    fn to_attributes(&self) -> Vec<(String, String)> {
        let pairs: Vec<(&str, f64)> = match self {
            Geometry::Rect(r) => {
                let mut pairs = vec![("x", r.x), ("y", r.y), ("width", r.width), ("height", r.height)];
                pairs.extend(r.rx.map(|v| ("rx", v)));
                pairs.extend(r.ry.map(|v| ("ry", v)));
                pairs
            }
            Geometry::Circle { cx, cy, r } => vec![("cx", *cx), ("cy", *cy), ("r", *r)],
            Geometry::Ellipse { cx, cy, rx, ry } => {
                vec![("cx", *cx), ("cy", *cy), ("rx", *rx), ("ry", *ry)]
            }
            Geometry::Path(commands) => return vec![("d".to_string(), serialize(commands))],
        };
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), format_number(v)))
            .collect()
    }
}

/// Joint lifecycle of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JointState {
    #[default]
    Unjointed,
    Jointed {
        kind: JointKind,
        direction: JointDirection,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: ShapeId,
    pub geometry: Geometry,
    pub annotations: ShapeAnnotations,
    /// Path template in unscaled design space.
    pub template: Option<Template>,
    pub joint_state: JointState,
    /// Every other attribute, including `id`, `class` and `style`.
    pub attributes: BTreeMap<String, String>,
}

impl Shape {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: ShapeId::new(),
            geometry,
            annotations: ShapeAnnotations::default(),
            template: None,
            joint_state: JointState::Unjointed,
            attributes: BTreeMap::new(),
        }
    }

    /// Build a shape from an SVG element. Returns an error for elements
    /// that are not shapes or lack the attributes their geometry needs.
    pub fn from_element(
        tag: &str,
        mut attributes: BTreeMap<String, String>,
        prefix: &str,
    ) -> DesignerResult<Self> {
        let mut take = |name: &str, default: Option<f64>| -> DesignerResult<f64> {
            match attributes.remove(name) {
                Some(value) => parse_number(name, &value),
                None => default.ok_or_else(|| DesignerError::MissingAttribute {
                    element: tag.to_string(),
                    name: name.to_string(),
                }),
            }
        };

        let geometry = match tag {
            "rect" => {
                let mut rect = Rect::new(
                    take("x", Some(0.0))?,
                    take("y", Some(0.0))?,
                    take("width", None)?,
                    take("height", None)?,
                );
                rect.rx = take("rx", None).ok();
                rect.ry = take("ry", None).ok();
                Geometry::Rect(rect)
            }
            "circle" => Geometry::Circle {
                cx: take("cx", Some(0.0))?,
                cy: take("cy", Some(0.0))?,
                r: take("r", None)?,
            },
            "ellipse" => Geometry::Ellipse {
                cx: take("cx", Some(0.0))?,
                cy: take("cy", Some(0.0))?,
                rx: take("rx", None)?,
                ry: take("ry", None)?,
            },
            "path" => {
                let data = attributes
                    .remove("d")
                    .ok_or_else(|| DesignerError::MissingAttribute {
                        element: tag.to_string(),
                        name: "d".to_string(),
                    })?;
                Geometry::Path(parse(&data)?)
            }
            other => return Err(DesignerError::UnsupportedGeometry(other.to_string())),
        };

        let template_name = format!("{}:template", prefix);
        let template = match attributes.get(&template_name) {
            Some(source) => match Template::parse(source) {
                Ok(template) => {
                    attributes.remove(&template_name);
                    Some(template)
                }
                Err(e) => {
                    tracing::warn!("Keeping unparsable template '{}' as text: {}", source, e);
                    None
                }
            },
            None => None,
        };

        let annotations = ShapeAnnotations::extract(prefix, &mut attributes);

        Ok(Self {
            id: ShapeId::new(),
            geometry,
            annotations,
            template,
            joint_state: JointState::Unjointed,
            attributes,
        })
    }

    /// The element's `id` attribute.
    pub fn element_id(&self) -> Option<&str> {
        self.attributes.get("id").map(String::as_str)
    }

    /// Element id if present, otherwise the session id.
    pub fn label(&self) -> String {
        match self.element_id() {
            Some(id) => format!("#{}", id),
            None => self.id.to_string(),
        }
    }

    pub fn path(&self) -> Option<&[PathCommand]> {
        self.geometry.as_path()
    }

    pub fn with_geometry(&self, geometry: Geometry) -> Self {
        Self {
            geometry,
            ..self.clone()
        }
    }

    /// Attributes in output order: id, geometry, other attributes,
    /// annotations, template.
    pub fn to_attributes(&self, prefix: &str) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Some(id) = self.element_id() {
            out.push(("id".to_string(), id.to_string()));
        }
        out.extend(self.geometry.to_attributes());
        out.extend(
            self.attributes
                .iter()
                .filter(|(k, _)| k.as_str() != "id")
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        out.extend(
            self.annotations
                .to_attributes()
                .into_iter()
                .map(|(k, v)| (format!("{}:{}", prefix, k), v)),
        );
        if let Some(template) = &self.template {
            out.push((format!("{}:template", prefix), template.to_string()));
        }
        out
    }
}

/// Parse a numeric attribute, ignoring any unit suffix.
pub(crate) fn parse_number(name: &str, value: &str) -> DesignerResult<f64> {
    value
        .parse::<Length>()
        .map(|len| len.value)
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DesignerError::invalid(name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::ThicknessAdjust;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_rect_from_element() {
        let shape = Shape::from_element(
            "rect",
            attrs(&[
                ("id", "slot"),
                ("width", "30"),
                ("height", "4mm"),
                ("style", "fill:none"),
                ("laser:thickness-adjust", "height"),
            ]),
            "laser",
        )
        .unwrap();

        assert_eq!(shape.geometry, Geometry::Rect(Rect::new(0.0, 0.0, 30.0, 4.0)));
        assert_eq!(shape.annotations.thickness_adjust, ThicknessAdjust::Height);
        assert_eq!(shape.element_id(), Some("slot"));
        assert_eq!(shape.label(), "#slot");
        assert!(shape.attributes.contains_key("style"));
    }

    #[test]
    fn test_missing_and_invalid_attributes() {
        let err = Shape::from_element("circle", attrs(&[("cx", "1")]), "laser").unwrap_err();
        assert!(matches!(err, DesignerError::MissingAttribute { .. }));

        let err = Shape::from_element("rect", attrs(&[("width", "a"), ("height", "1")]), "laser")
            .unwrap_err();
        assert!(matches!(err, DesignerError::InvalidAttribute { .. }));

        let err = Shape::from_element("path", attrs(&[("d", "L 1 1")]), "laser").unwrap_err();
        assert!(matches!(err, DesignerError::Path(_)));
    }

    #[test]
    fn test_template_kept_parsed() {
        let shape = Shape::from_element(
            "path",
            attrs(&[("d", "M 0 0 l 4 0"), ("laser:template", "M 0 0 l {thickness} 0")]),
            "laser",
        )
        .unwrap();
        assert_eq!(
            shape.template.as_ref().map(|t| t.to_string()).as_deref(),
            Some("M 0 0 l {thickness} 0")
        );
        assert!(!shape.attributes.contains_key("laser:template"));
    }

    #[test]
    fn test_bad_template_preserved_as_text() {
        let shape = Shape::from_element(
            "path",
            attrs(&[("d", "M 0 0 l 4 0"), ("laser:template", "M 0 0 l {width} 0")]),
            "laser",
        )
        .unwrap();
        // Unknown symbols only fail at evaluation, so this one parses
        assert!(shape.template.is_some());

        let shape = Shape::from_element(
            "path",
            attrs(&[("d", "M 0 0 l 4 0"), ("laser:template", "M 0 0 l {thickness 0")]),
            "laser",
        )
        .unwrap();
        assert!(shape.template.is_none());
        assert!(shape.attributes.contains_key("laser:template"));
    }

    #[test]
    fn test_attribute_order() {
        let mut shape = Shape::new(Geometry::Circle {
            cx: 5.0,
            cy: 5.0,
            r: 2.5,
        });
        shape.attributes.insert("id".to_string(), "hole".to_string());
        shape.attributes.insert("class".to_string(), "cut".to_string());
        shape.annotations.set("kerf-adjust", "grow").unwrap();

        let names: Vec<String> = shape
            .to_attributes("laser")
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(names, vec!["id", "cx", "cy", "r", "class", "laser:kerf-adjust"]);
    }
}
