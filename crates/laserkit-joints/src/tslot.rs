//! T-slot joints for nut and bolt assemblies.
//!
//! On the slot side (`inset > 0`) every odd finger is a T-shaped slot that
//! takes the bolt shaft and a captive nut. On the screw side (`inset < 0`)
//! every odd finger is a straight run with a bolt hole drawn as two arcs,
//! reached and left through moves that draw nothing.

use laserkit_core::{FabricationContext, TSlotSettings};
use laserkit_path::Edge;

use crate::finger::finger_width;
use crate::generator::JointGenerator;
use crate::pattern::{JointParams, JointPattern, Linear, PatternBuilder};

pub struct TSlotJoint {
    settings: TSlotSettings,
}

impl TSlotJoint {
    pub fn new(settings: TSlotSettings) -> Self {
        Self { settings }
    }

    fn slot(&self, builder: &mut PatternBuilder, finger: f64) {
        let TSlotSettings {
            nut_width,
            nut_depth,
            bolt_diameter,
            ..
        } = self.settings;
        let shaft = Linear::thickness(0.5);
        let flank = (finger - bolt_diameter) / 2.0;

        builder
            .along(flank)
            .line(Linear::ZERO, shaft)
            .along(-nut_width)
            .line(Linear::ZERO, Linear::fixed(nut_depth))
            .along(nut_width)
            .line(Linear::ZERO, shaft)
            .along(bolt_diameter)
            .line(Linear::ZERO, Linear::thickness(-0.5))
            .along(nut_width)
            .line(Linear::ZERO, Linear::fixed(-nut_depth))
            .along(-nut_width)
            .line(Linear::ZERO, Linear::thickness(-0.5))
            .along(flank);
    }

    fn bolt_hole(&self, builder: &mut PatternBuilder, finger: f64) {
        let to_hole = Linear::new(0.5, 0.5 * finger);
        let offset = Linear::thickness(self.settings.hole_offset_ratio);
        let radius = Linear::thickness(0.5);

        builder
            .jump(to_hole, Linear::ZERO)
            .jump(Linear::ZERO, offset)
            .arc(radius, Linear::thickness(-1.0), Linear::ZERO, false, false)
            .arc(radius, Linear::thickness(1.0), Linear::ZERO, false, false)
            .jump(Linear::ZERO, Linear::thickness(-self.settings.hole_offset_ratio))
            .jump(Linear::new(-0.5, -0.5 * finger), Linear::ZERO)
            .along(finger);
    }
}

impl JointGenerator for TSlotJoint {
    fn generate(
        &self,
        edge: &Edge,
        params: &JointParams,
        _ctx: &FabricationContext,
    ) -> Option<JointPattern> {
        let finger = finger_width(edge, params)?;
        let sign = params.sign();
        let slot_side = params.inset > 0.0;

        let mut builder = PatternBuilder::new(edge, params.thickness());
        builder.along(params.gap);
        for i in 0..params.count {
            if i > 0 {
                builder.along(finger);
            }
            if i % 2 == 0 {
                builder
                    .line(Linear::ZERO, Linear::thickness(-sign))
                    .along(finger)
                    .line(Linear::ZERO, Linear::thickness(sign));
            } else if slot_side {
                self.slot(&mut builder, finger);
            } else {
                self.bolt_hole(&mut builder, finger);
            }
        }
        builder.along(params.gap);

        builder.build()
    }
}
