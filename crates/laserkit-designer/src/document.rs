//! SVG documents
//!
//! The document is read with the `svg` crate's event parser into a small
//! tree: shapes the engine understands, groups (whose `translate`
//! transforms are scaled with the drawing), and every other element, text
//! node, comment or declaration passed through untouched. Writing is
//! deterministic: the same tree always produces the same string.
//!
//! Attribute values are held decoded (`a & b`) and escaped again on output.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use laserkit_core::Length;
use laserkit_path::format_number;
use svg::node::element::tag;
use svg::parser::Event;

use crate::annotations::{DEFAULT_PREFIX, LASER_NAMESPACE};
use crate::error::{DesignerError, DesignerResult};
use crate::shape::{parse_number, Shape, ShapeId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl FromStr for ViewBox {
    type Err = DesignerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values: Vec<f64> = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .map(|t| t.parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| DesignerError::invalid("viewBox", s))?;
        match values.as_slice() {
            [min_x, min_y, width, height] => Ok(Self {
                min_x: *min_x,
                min_y: *min_y,
                width: *width,
                height: *height,
            }),
            _ => Err(DesignerError::invalid("viewBox", s)),
        }
    }
}

impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            format_number(self.min_x),
            format_number(self.min_y),
            format_number(self.width),
            format_number(self.height)
        )
    }
}

/// One function of a `transform` list, e.g. `translate(10 20)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOp {
    pub name: String,
    pub args: Vec<f64>,
}

impl TransformOp {
    /// Parse a transform list. `None` if any function is malformed.
    pub fn parse_list(input: &str) -> Option<Vec<TransformOp>> {
        let mut ops = Vec::new();
        for chunk in input.split(')') {
            let chunk = chunk.trim().trim_start_matches(',').trim();
            if chunk.is_empty() {
                continue;
            }
            let (name, args) = chunk.split_once('(')?;
            let args = args
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|t| !t.is_empty())
                .map(|t| t.parse::<f64>().ok())
                .collect::<Option<Vec<f64>>>()?;
            ops.push(TransformOp {
                name: name.trim().to_string(),
                args,
            });
        }
        Some(ops)
    }

    fn write_list(ops: &[TransformOp]) -> String {
        ops.iter()
            .map(|op| {
                let args: Vec<String> = op.args.iter().map(|v| format_number(*v)).collect();
                format!("{}({})", op.name, args.join(" "))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub transform: Vec<TransformOp>,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

impl Group {
    /// Multiply every `translate` offset by `factor`.
    pub fn scale_translation(&mut self, factor: f64) {
        for op in self.transform.iter_mut().filter(|op| op.name == "translate") {
            for arg in &mut op.args {
                *arg *= factor;
            }
        }
    }
}

/// An element the engine does not interpret.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Shape(Shape),
    Group(Group),
    Element(Element),
    Text(String),
    /// Comment or processing instruction, verbatim.
    Markup(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    prefix: String,
    pub view_box: Option<ViewBox>,
    pub width: Option<Length>,
    pub height: Option<Length>,
    /// Persisted `material-thickness` of the root.
    pub material_thickness: Option<f64>,
    /// Persisted `kerf` of the root.
    pub kerf: Option<f64>,
    /// Remaining root attributes, namespace declarations included.
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Node>,
    /// XML declaration, doctype and comments ahead of the root, verbatim.
    pub prologue: Vec<String>,
    /// Comments after the root, verbatim.
    pub epilogue: Vec<String>,
}

/// Stands in for `&` while parsing: the event parser ends an attribute value
/// at the first character reference.
const AMPERSAND: char = '\u{E000}';

struct Frame {
    name: String,
    attributes: BTreeMap<String, String>,
    children: Vec<Node>,
}

impl Frame {
    fn new(name: &str, attributes: svg::node::Attributes) -> Self {
        Self {
            name: name.to_string(),
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k, unescape(&v.replace(AMPERSAND, "&"))))
                .collect(),
            children: Vec::new(),
        }
    }

    fn into_node(self, prefix: &str) -> Node {
        match self.name.as_str() {
            "rect" | "circle" | "ellipse" | "path" => {
                if !self.children.is_empty() {
                    tracing::debug!("Dropping {} child nodes of <{}>", self.children.len(), self.name);
                }
                match Shape::from_element(&self.name, self.attributes.clone(), prefix) {
                    Ok(shape) => Node::Shape(shape),
                    Err(e) => {
                        tracing::warn!("Passing <{}> through unchanged: {}", self.name, e);
                        Node::Element(Element {
                            name: self.name,
                            attributes: self.attributes,
                            children: self.children,
                        })
                    }
                }
            }
            "g" => {
                let mut attributes = self.attributes;
                let transform = match attributes.get("transform").map(|t| TransformOp::parse_list(t)) {
                    Some(Some(ops)) => {
                        attributes.remove("transform");
                        ops
                    }
                    Some(None) => {
                        tracing::warn!("Keeping unparsable group transform as text");
                        Vec::new()
                    }
                    None => Vec::new(),
                };
                Node::Group(Group {
                    transform,
                    attributes,
                    children: self.children,
                })
            }
            _ => Node::Element(Element {
                name: self.name,
                attributes: self.attributes,
                children: self.children,
            }),
        }
    }
}

impl Document {
    pub fn parse(source: &str) -> DesignerResult<Self> {
        let masked = source.replace('&', &AMPERSAND.to_string());
        let parser = svg::read(&masked).map_err(|e| DesignerError::Svg(e.to_string()))?;

        let mut prefix = DEFAULT_PREFIX.to_string();
        let mut stack: Vec<Frame> = Vec::new();
        let mut root: Option<Frame> = None;
        let mut markup = MarkupCursor::new(source);
        let (mut prologue, mut epilogue) = (Vec::new(), Vec::new());

        for event in parser {
            let raw = match event {
                Event::Comment => markup.take("<!--", "-->"),
                Event::Declaration => markup.take("<!", ">"),
                Event::Instruction => markup.take("<?", ">"),
                _ => None,
            };
            if let Some(raw) = raw {
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Markup(raw.to_string())),
                    None if root.is_none() => prologue.push(raw.to_string()),
                    None => epilogue.push(raw.to_string()),
                }
                continue;
            }

            match event {
                Event::Error(e) => return Err(DesignerError::Svg(e.to_string())),
                Event::Tag(name, tag::Type::Start, attributes) => {
                    let frame = Frame::new(name, attributes);
                    if stack.is_empty() {
                        prefix = namespace_prefix(&frame.attributes);
                    }
                    stack.push(frame);
                }
                Event::Tag(name, tag::Type::Empty, attributes) => {
                    let frame = Frame::new(name, attributes);
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(frame.into_node(&prefix)),
                        None if root.is_none() => root = Some(frame),
                        None => {}
                    }
                }
                Event::Tag(name, tag::Type::End, _) => {
                    let frame = stack
                        .pop()
                        .ok_or_else(|| DesignerError::Svg(format!("unexpected </{}>", name)))?;
                    if frame.name != name {
                        return Err(DesignerError::Svg(format!(
                            "</{}> closes <{}>",
                            name, frame.name
                        )));
                    }
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(frame.into_node(&prefix)),
                        None if root.is_none() => root = Some(frame),
                        None => {}
                    }
                }
                Event::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        if !text.trim().is_empty() {
                            parent.children.push(Node::Text(text.replace(AMPERSAND, "&")));
                        }
                    }
                }
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(DesignerError::Svg(format!("<{}> is never closed", open.name)));
        }
        let root = root.filter(|f| f.name == "svg").ok_or(DesignerError::MissingRoot)?;
        let mut document = Self::from_root(root, prefix);
        document.prologue = prologue;
        document.epilogue = epilogue;
        Ok(document)
    }

    fn from_root(root: Frame, prefix: String) -> Self {
        let mut attributes = root.attributes;

        let view_box = attributes.remove("viewBox").and_then(|v| match v.parse() {
            Ok(vb) => Some(vb),
            Err(e) => {
                tracing::warn!("Ignoring root viewBox: {}", e);
                None
            }
        });
        let mut length = |name: &str| {
            attributes.remove(name).and_then(|v| match v.parse::<Length>() {
                Ok(len) => Some(len),
                Err(e) => {
                    tracing::warn!("Ignoring root {}: {}", name, e);
                    None
                }
            })
        };
        let width = length("width");
        let height = length("height");

        let mut number = |name: String| {
            attributes.remove(&name).and_then(|v| match parse_number(&name, &v) {
                Ok(n) => Some(n),
                Err(e) => {
                    tracing::warn!("Ignoring root attribute: {}", e);
                    None
                }
            })
        };
        let material_thickness = number(format!("{}:material-thickness", prefix));
        let kerf = number(format!("{}:kerf", prefix));

        Self {
            prefix,
            view_box,
            width,
            height,
            material_thickness,
            kerf,
            attributes,
            children: root.children,
            prologue: Vec::new(),
            epilogue: Vec::new(),
        }
    }

    /// Namespace prefix bound to the LaserSVG namespace.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Record the fabrication parameters on the root element.
    pub fn stamp(&mut self, material_thickness: f64, kerf: f64) {
        self.material_thickness = Some(material_thickness);
        self.kerf = Some(kerf);
    }

    /// Scale the root viewBox and size, keeping unit suffixes.
    pub fn scale_canvas(&mut self, factor: f64) {
        if let Some(vb) = &mut self.view_box {
            vb.width *= factor;
            vb.height *= factor;
        }
        self.width = self.width.as_ref().map(|w| w.scaled(factor));
        self.height = self.height.as_ref().map(|h| h.scaled(factor));
    }

    /// All shapes in document order.
    pub fn shapes(&self) -> Vec<&Shape> {
        fn collect<'a>(nodes: &'a [Node], out: &mut Vec<&'a Shape>) {
            for node in nodes {
                match node {
                    Node::Shape(shape) => out.push(shape),
                    Node::Group(group) => collect(&group.children, out),
                    Node::Element(element) => collect(&element.children, out),
                    Node::Text(_) | Node::Markup(_) => {}
                }
            }
        }
        let mut out = Vec::new();
        collect(&self.children, &mut out);
        out
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes().into_iter().find(|s| s.id == id)
    }

    /// Shape whose `id` attribute is `element_id`.
    pub fn find(&self, element_id: &str) -> Option<&Shape> {
        self.shapes()
            .into_iter()
            .find(|s| s.element_id() == Some(element_id))
    }

    /// Replace each shape for which `f` returns a new value.
    pub fn update_shapes<F>(&mut self, mut f: F)
    where
        F: FnMut(&Shape) -> Option<Shape>,
    {
        self.expand_shapes(|shape| f(shape).map(|s| vec![s]));
    }

    /// Replace each shape for which `f` returns a list with that list, in
    /// place. An empty list removes the shape.
    pub fn expand_shapes<F>(&mut self, mut f: F)
    where
        F: FnMut(&Shape) -> Option<Vec<Shape>>,
    {
        fn walk<F>(nodes: &mut Vec<Node>, f: &mut F)
        where
            F: FnMut(&Shape) -> Option<Vec<Shape>>,
        {
            let mut i = 0;
            while i < nodes.len() {
                let replacement = match &mut nodes[i] {
                    Node::Shape(shape) => f(shape),
                    Node::Group(group) => {
                        walk(&mut group.children, f);
                        None
                    }
                    Node::Element(element) => {
                        walk(&mut element.children, f);
                        None
                    }
                    Node::Text(_) | Node::Markup(_) => None,
                };
                match replacement {
                    Some(shapes) => {
                        let count = shapes.len();
                        nodes.splice(i..=i, shapes.into_iter().map(Node::Shape));
                        i += count;
                    }
                    None => i += 1,
                }
            }
        }
        walk(&mut self.children, &mut f);
    }

    /// Replace the shape with `id`. Returns `false` if no such shape exists.
    pub fn replace_shape(&mut self, id: ShapeId, replacement: Shape) -> bool {
        let mut replacement = Some(replacement);
        self.update_shapes(|shape| if shape.id == id { replacement.take() } else { None });
        replacement.is_none()
    }

    /// Call `f` on every group, outer groups first.
    pub fn for_each_group<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Group),
    {
        fn walk<F: FnMut(&mut Group)>(nodes: &mut [Node], f: &mut F) {
            for node in nodes {
                match node {
                    Node::Group(group) => {
                        f(group);
                        walk(&mut group.children, f);
                    }
                    Node::Element(element) => walk(&mut element.children, f),
                    _ => {}
                }
            }
        }
        walk(&mut self.children, &mut f);
    }

    pub fn to_svg_string(&self) -> String {
        self.write_with(&[])
    }

    /// Serialize with `overlays` appended as the last children of the root.
    pub fn write_with(&self, overlays: &[Node]) -> String {
        let mut out = String::new();
        for item in &self.prologue {
            out.push_str(item);
            out.push('\n');
        }
        out.push_str("<svg");
        for (name, value) in self.root_attributes() {
            write_attribute(&mut out, &name, &value);
        }
        out.push_str(">\n");
        for node in self.children.iter().chain(overlays) {
            write_node(&mut out, node, &self.prefix, 1);
        }
        out.push_str("</svg>\n");
        for item in &self.epilogue {
            out.push_str(item);
            out.push('\n');
        }
        out
    }

    fn root_attributes(&self) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = self
            .attributes
            .iter()
            .filter(|(k, _)| k.starts_with("xmlns"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let declaration = format!("xmlns:{}", self.prefix);
        if !self.attributes.contains_key(&declaration) {
            out.push((declaration, LASER_NAMESPACE.to_string()));
        }
        if let Some(width) = &self.width {
            out.push(("width".to_string(), length_string(width)));
        }
        if let Some(height) = &self.height {
            out.push(("height".to_string(), length_string(height)));
        }
        if let Some(vb) = &self.view_box {
            out.push(("viewBox".to_string(), vb.to_string()));
        }
        out.extend(
            self.attributes
                .iter()
                .filter(|(k, _)| !k.starts_with("xmlns"))
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        if let Some(t) = self.material_thickness {
            out.push((format!("{}:material-thickness", self.prefix), format_number(t)));
        }
        if let Some(k) = self.kerf {
            out.push((format!("{}:kerf", self.prefix), format_number(k)));
        }
        out
    }
}

fn namespace_prefix(attributes: &BTreeMap<String, String>) -> String {
    attributes
        .iter()
        .find(|(k, v)| k.starts_with("xmlns:") && v.as_str() == LASER_NAMESPACE)
        .map(|(k, _)| k["xmlns:".len()..].to_string())
        .unwrap_or_else(|| DEFAULT_PREFIX.to_string())
}

fn length_string(length: &Length) -> String {
    format!("{}{}", format_number(length.value), length.unit)
}

fn write_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}

/// Decode the predefined and numeric character references of an attribute
/// value. Anything else, a lone `&` included, is kept as written.
fn unescape(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').and_then(|end| {
            let c = match &rest[1..end] {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                entity => entity
                    .strip_prefix('#')
                    .and_then(|code| match code.strip_prefix('x') {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => code.parse().ok(),
                    })
                    .and_then(char::from_u32),
            };
            c.map(|c| (c, end))
        });
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Walks the source alongside the event parser, which reports comments,
/// declarations and instructions without their text.
struct MarkupCursor<'a> {
    source: &'a str,
    offset: usize,
}

impl<'a> MarkupCursor<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, offset: 0 }
    }

    fn take(&mut self, open: &str, close: &str) -> Option<&'a str> {
        let rest = &self.source[self.offset..];
        let start = rest.find(open)?;
        let body = start + open.len();
        let end = body + rest[body..].find(close)? + close.len();
        self.offset += end;
        Some(&rest[start..end])
    }
}

fn write_element(
    out: &mut String,
    name: &str,
    attributes: &[(String, String)],
    children: &[Node],
    prefix: &str,
    depth: usize,
) {
    let indent = "  ".repeat(depth);
    out.push_str(&indent);
    out.push('<');
    out.push_str(name);
    for (k, v) in attributes {
        write_attribute(out, k, v);
    }
    if children.is_empty() {
        out.push_str("/>\n");
        return;
    }
    out.push('>');
    if children.iter().all(|c| matches!(c, Node::Text(_))) {
        for child in children {
            if let Node::Text(text) = child {
                out.push_str(text);
            }
        }
    } else {
        out.push('\n');
        for child in children {
            write_node(out, child, prefix, depth + 1);
        }
        out.push_str(&indent);
    }
    out.push_str("</");
    out.push_str(name);
    out.push_str(">\n");
}

fn write_node(out: &mut String, node: &Node, prefix: &str, depth: usize) {
    let pairs = |map: &BTreeMap<String, String>| -> Vec<(String, String)> {
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    };
    match node {
        Node::Shape(shape) => write_element(
            out,
            shape.geometry.tag(),
            &shape.to_attributes(prefix),
            &[],
            prefix,
            depth,
        ),
        Node::Group(group) => {
            let mut attributes = pairs(&group.attributes);
            if !group.transform.is_empty() {
                attributes.push(("transform".to_string(), TransformOp::write_list(&group.transform)));
            }
            write_element(out, "g", &attributes, &group.children, prefix, depth)
        }
        Node::Element(element) => write_element(
            out,
            &element.name,
            &pairs(&element.attributes),
            &element.children,
            prefix,
            depth,
        ),
        Node::Text(text) => {
            out.push_str(&"  ".repeat(depth));
            out.push_str(text.trim());
            out.push('\n');
        }
        Node::Markup(markup) => {
            out.push_str(&"  ".repeat(depth));
            out.push_str(markup);
            out.push('\n');
        }
    }
}
