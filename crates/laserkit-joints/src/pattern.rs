//! Joint patterns and the builder the generators draw with.
//!
//! Every segment is given in edge coordinates (`along` the edge direction,
//! `across` along its normal) as `thickness_ratio * thickness + constant`.
//! Components with a thickness part become template expressions.

use laserkit_core::Point;
use laserkit_path::{Edge, PathCommand, Position, Verb};
use laserkit_template::{to_template, ParamMark, Template, TemplateResult};

/// Input to a joint generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointParams {
    /// Straight run at both ends of the edge
    pub gap: f64,
    /// Signed tab depth: `direction * thickness`
    pub inset: f64,
    /// Number of fingers or flaps
    pub count: u32,
}

impl JointParams {
    pub fn new(gap: f64, inset: f64, count: u32) -> Self {
        Self { gap, inset, count }
    }

    /// The thickness the inset was derived from.
    pub fn thickness(&self) -> f64 {
        self.inset.abs()
    }

    /// `+1` for outside joints, `-1` for inside joints.
    pub fn sign(&self) -> f64 {
        if self.inset < 0.0 {
            -1.0
        } else {
            1.0
        }
    }
}

/// A generated joint: the concrete path and the template it evaluates from.
#[derive(Debug, Clone, PartialEq)]
pub struct JointPattern {
    pub path: Vec<PathCommand>,
    /// `None` when the joint has no thickness dependency to keep.
    pub template: Option<Template>,
}

/// A length of the form `ratio * thickness + constant`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Linear {
    pub ratio: f64,
    pub constant: f64,
}

impl Linear {
    pub const ZERO: Linear = Linear {
        ratio: 0.0,
        constant: 0.0,
    };

    pub fn fixed(constant: f64) -> Self {
        Self {
            ratio: 0.0,
            constant,
        }
    }

    pub fn thickness(ratio: f64) -> Self {
        Self {
            ratio,
            constant: 0.0,
        }
    }

    pub fn new(ratio: f64, constant: f64) -> Self {
        Self { ratio, constant }
    }

    fn value(&self, thickness: f64) -> f64 {
        self.ratio * thickness + self.constant
    }
}

/// Accumulates relative commands from an edge start.
pub struct PatternBuilder {
    direction: Point,
    normal: Point,
    thickness: f64,
    commands: Vec<PathCommand>,
    marks: Vec<ParamMark>,
}

impl PatternBuilder {
    pub fn new(edge: &Edge, thickness: f64) -> Self {
        Self {
            direction: edge.direction,
            normal: edge.normal,
            thickness,
            commands: vec![PathCommand::move_to(
                Position::Absolute,
                edge.start.x,
                edge.start.y,
            )],
            marks: Vec::new(),
        }
    }

    /// Relative line `direction * along + normal * across`.
    pub fn line(&mut self, along: Linear, across: Linear) -> &mut Self {
        self.segment(Verb::Line, along, across)
    }

    /// Relative move, drawing nothing.
    pub fn jump(&mut self, along: Linear, across: Linear) -> &mut Self {
        self.segment(Verb::Move, along, across)
    }

    pub fn along(&mut self, length: f64) -> &mut Self {
        self.line(Linear::fixed(length), Linear::ZERO)
    }

    /// Relative circular arc to the point `direction * along + normal * across`.
    pub fn arc(
        &mut self,
        radius: Linear,
        along: Linear,
        across: Linear,
        large_arc: bool,
        sweep: bool,
    ) -> &mut Self {
        let index = self.commands.len();
        let (x, y) = self.components(along, across);
        let r = radius.value(self.thickness);
        self.commands.push(PathCommand::arc_to(
            Position::Relative,
            r,
            r,
            0.0,
            large_arc,
            sweep,
            x.value(self.thickness),
            y.value(self.thickness),
        ));
        self.mark(index, 0, radius);
        self.mark(index, 1, radius);
        self.mark(index, 5, x);
        self.mark(index, 6, y);
        self
    }

    fn segment(&mut self, verb: Verb, along: Linear, across: Linear) -> &mut Self {
        let index = self.commands.len();
        let (x, y) = self.components(along, across);
        let (dx, dy) = (x.value(self.thickness), y.value(self.thickness));
        self.commands.push(if verb == Verb::Move {
            PathCommand::move_to(Position::Relative, dx, dy)
        } else {
            PathCommand::line_to(Position::Relative, dx, dy)
        });
        self.mark(index, 0, x);
        self.mark(index, 1, y);
        self
    }

    /// Project edge coordinates onto the drawing axes.
    fn components(&self, along: Linear, across: Linear) -> (Linear, Linear) {
        let (d, n) = (self.direction, self.normal);
        (
            Linear::new(
                d.x * along.ratio + n.x * across.ratio,
                d.x * along.constant + n.x * across.constant,
            ),
            Linear::new(
                d.y * along.ratio + n.y * across.ratio,
                d.y * along.constant + n.y * across.constant,
            ),
        )
    }

    fn mark(&mut self, command: usize, param: usize, component: Linear) {
        if component.ratio != 0.0 {
            self.marks.push(ParamMark::linear(
                command,
                param,
                component.ratio,
                component.constant,
            ));
        }
    }

    pub fn finish(self) -> TemplateResult<JointPattern> {
        let template = if self.thickness > 0.0 {
            to_template(&self.commands, &self.marks, self.thickness)?
        } else {
            Template::from_path(&self.commands)
        };
        Ok(JointPattern {
            path: self.commands,
            template: Some(template),
        })
    }

    /// [`finish`](Self::finish) for generators: a pattern whose template
    /// cannot be written is no pattern.
    pub fn build(self) -> Option<JointPattern> {
        match self.finish() {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                tracing::warn!("Dropping joint pattern: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laserkit_template::evaluate;

    fn horizontal(len: f64) -> Edge {
        Edge::new(Point::new(0.0, 0.0), Point::new(len, 0.0))
    }

    #[test]
    fn test_components_follow_edge_frame() {
        let mut builder = PatternBuilder::new(&horizontal(10.0), 3.0);
        builder.line(Linear::fixed(2.0), Linear::thickness(1.0));
        let pattern = builder.finish().unwrap();
        assert_eq!(pattern.path[1].params.as_slice(), &[2.0, 3.0]);
        assert_eq!(
            pattern.template.unwrap().to_string(),
            "M 0 0 l 2 {thickness}"
        );
    }

    #[test]
    fn test_template_tracks_thickness() {
        let mut builder = PatternBuilder::new(&horizontal(10.0), 3.0);
        builder
            .line(Linear::ZERO, Linear::new(0.5, -0.2))
            .line(Linear::new(-2.0, 8.0), Linear::ZERO);
        let template = builder.finish().unwrap().template.unwrap();
        let path = evaluate(&template, 4.0).unwrap();
        assert_eq!(path[1].params.as_slice(), &[0.0, 1.8]);
        assert_eq!(path[2].params.as_slice(), &[0.0, 0.0]);
    }
}
