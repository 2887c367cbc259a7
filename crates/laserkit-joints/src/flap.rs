//! Flap joints.

use laserkit_core::FabricationContext;
use laserkit_path::Edge;
use laserkit_template::Template;

use crate::generator::{straight_path, JointGenerator};
use crate::pattern::{JointParams, JointPattern, Linear, PatternBuilder};

/// Trapezoidal flaps with 45 degree flanks. Flaps have no inside form: an
/// inside flap edge is a straight line.
pub struct FlapJoint;

impl JointGenerator for FlapJoint {
    fn generate(
        &self,
        edge: &Edge,
        params: &JointParams,
        _ctx: &FabricationContext,
    ) -> Option<JointPattern> {
        if edge.is_degenerate() || params.count == 0 {
            return None;
        }

        if params.inset < 0.0 {
            let path = straight_path(edge);
            let template = Template::from_path(&path);
            return Some(JointPattern {
                path,
                template: Some(template),
            });
        }

        let flap = (edge.length - 2.0 * params.gap) / f64::from(params.count);
        if flap <= 0.0 {
            return None;
        }
        if flap < 2.0 * params.thickness() {
            tracing::warn!(
                "Flaps of {} are shorter than their two {} flanks, the outline crosses itself",
                flap,
                params.thickness()
            );
        }

        let mut builder = PatternBuilder::new(edge, params.thickness());
        builder.along(params.gap);
        for _ in 0..params.count {
            builder
                .line(Linear::thickness(1.0), Linear::thickness(1.0))
                .line(Linear::new(-2.0, flap), Linear::ZERO)
                .line(Linear::thickness(1.0), Linear::thickness(-1.0));
        }
        builder.along(params.gap);

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laserkit_core::Point;
    use laserkit_path::serialize;

    #[test]
    fn test_outside_flaps() {
        let edge = Edge::new(Point::new(0.0, 0.0), Point::new(50.0, 0.0));
        let pattern = FlapJoint
            .generate(
                &edge,
                &JointParams::new(5.0, 2.0, 2),
                &FabricationContext::default(),
            )
            .unwrap();
        assert_eq!(
            serialize(&pattern.path),
            "M 0 0 l 5 0 l 2 2 l 16 0 l 2 -2 l 2 2 l 16 0 l 2 -2 l 5 0"
        );
        assert_eq!(
            pattern.template.unwrap().to_string(),
            "M 0 0 l 5 0 l {thickness} {thickness} l {-2*thickness + 20} 0 \
             l {thickness} -{thickness} l {thickness} {thickness} l {-2*thickness + 20} 0 \
             l {thickness} -{thickness} l 5 0"
        );
    }

    #[test]
    fn test_short_flaps_still_reach_edge_end() {
        let edge = Edge::new(Point::new(0.0, 0.0), Point::new(12.0, 0.0));
        let pattern = FlapJoint
            .generate(
                &edge,
                &JointParams::new(1.0, 6.0, 1),
                &FabricationContext::default(),
            )
            .unwrap();
        assert_eq!(
            serialize(&pattern.path),
            "M 0 0 l 1 0 l 6 6 l -2 0 l 6 -6 l 1 0"
        );
    }

    #[test]
    fn test_inside_flap_is_straight() {
        let edge = Edge::new(Point::new(10.0, 0.0), Point::new(10.0, 50.0));
        let pattern = FlapJoint
            .generate(
                &edge,
                &JointParams::new(5.0, -2.0, 2),
                &FabricationContext::default(),
            )
            .unwrap();
        assert_eq!(serialize(&pattern.path), "M 10 0 l 0 50");
    }
}
