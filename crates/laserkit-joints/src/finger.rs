//! Finger joints.

use laserkit_core::FabricationContext;
use laserkit_path::Edge;

use crate::generator::JointGenerator;
use crate::pattern::{JointParams, JointPattern, Linear, PatternBuilder};

/// Width of one finger: the edge minus both gaps, divided into `count`
/// fingers and `count - 1` spaces of equal width.
pub(crate) fn finger_width(edge: &Edge, params: &JointParams) -> Option<f64> {
    if edge.is_degenerate() || params.count == 0 {
        return None;
    }
    let finger = (edge.length - 2.0 * params.gap) / f64::from(2 * params.count - 1);
    (finger > 0.0).then_some(finger)
}

/// Rectangular tabs of depth `inset`.
pub struct FingerJoint;

impl JointGenerator for FingerJoint {
    fn generate(
        &self,
        edge: &Edge,
        params: &JointParams,
        _ctx: &FabricationContext,
    ) -> Option<JointPattern> {
        let finger = finger_width(edge, params)?;
        let sign = params.sign();

        let mut builder = PatternBuilder::new(edge, params.thickness());
        builder.along(params.gap);
        for i in 0..params.count {
            if i > 0 {
                builder.along(finger);
            }
            builder
                .line(Linear::ZERO, Linear::thickness(sign))
                .along(finger)
                .line(Linear::ZERO, Linear::thickness(-sign));
        }
        builder.along(params.gap);

        builder.build()
    }
}

/// Finger joint whose rising flank carries a small semicircular relief of
/// kerf radius, so mating tabs seat fully.
///
/// The relief chord is `2 * kerf` rather than a fixed 0.5 units, so the
/// relief follows the cutter: each straight half of the rising flank is
/// `(inset - chord) / 2` long.
pub struct CompactFingerJoint;

impl JointGenerator for CompactFingerJoint {
    fn generate(
        &self,
        edge: &Edge,
        params: &JointParams,
        ctx: &FabricationContext,
    ) -> Option<JointPattern> {
        let finger = finger_width(edge, params)?;
        let sign = params.sign();
        // Templates live in unscaled space
        let kerf = ctx.kerf / ctx.scaling_factor;
        let chord = sign * 2.0 * kerf;
        let half_step = Linear::new(0.5 * sign, -chord / 2.0);

        let mut builder = PatternBuilder::new(edge, params.thickness());
        builder.along(params.gap);
        for i in 0..params.count {
            if i > 0 {
                builder.along(finger);
            }
            builder
                .line(Linear::ZERO, half_step)
                .arc(
                    Linear::fixed(kerf),
                    Linear::ZERO,
                    Linear::fixed(chord),
                    true,
                    false,
                )
                .line(Linear::ZERO, half_step)
                .along(finger)
                .line(Linear::ZERO, Linear::thickness(-sign));
        }
        builder.along(params.gap);

        builder.build()
    }
}
