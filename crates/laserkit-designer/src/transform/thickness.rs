//! Material thickness pass.

use laserkit_core::FabricationContext;
use laserkit_path::PathCommand;
use laserkit_template::{evaluate, Template};

use crate::annotations::{Origin, ThicknessAdjust};
use crate::error::DesignerResult;
use crate::shape::{Geometry, Shape};
use crate::transform::scale::scale_commands;

/// Concrete drawing geometry of a design-space template at drawing
/// thickness `thickness`.
pub fn realize_template(
    template: &Template,
    thickness: f64,
    ctx: &FabricationContext,
) -> DesignerResult<Vec<PathCommand>> {
    let design = evaluate(template, ctx.design_thickness(thickness))?;
    Ok(scale_commands(&design, ctx.scaling_factor))
}

/// Set the thickness-adjusted dimensions of a rectangle to `thickness`,
/// keeping its origin anchor in place.
///
/// The anchor is cached in `origin-x`/`origin-y` the first time it is
/// needed so repeated updates never accumulate rounding error.
pub fn pin_to_thickness(shape: &mut Shape, thickness: f64) {
    let adjust = shape.annotations.thickness_adjust;
    if adjust == ThicknessAdjust::None {
        return;
    }
    let Geometry::Rect(rect) = &mut shape.geometry else {
        return;
    };

    let origin = shape.annotations.origin.unwrap_or_default();
    let anchor = match (shape.annotations.origin_x, shape.annotations.origin_y) {
        _ if origin == Origin::TopLeft => None,
        (Some(x), Some(y)) => Some((x, y)),
        _ => {
            let anchor = origin.anchor(rect.x, rect.y, rect.width, rect.height);
            shape.annotations.origin_x = Some(anchor.0);
            shape.annotations.origin_y = Some(anchor.1);
            Some(anchor)
        }
    };

    if adjust.adjusts_width() {
        rect.width = thickness;
    }
    if adjust.adjusts_height() {
        rect.height = thickness;
    }

    if let Some(anchor) = anchor {
        let (x, y) = origin.position_for(anchor, rect.width, rect.height);
        if adjust.adjusts_width() {
            rect.x = x;
        }
        if adjust.adjusts_height() {
            rect.y = y;
        }
    }
}

/// Bring one shape in line with the context's material thickness.
///
/// A local `thickness` annotation takes precedence over the document value.
/// Paths with a template are regenerated from it; the template is never
/// touched.
pub fn apply_thickness(shape: &Shape, ctx: &FabricationContext) -> DesignerResult<Shape> {
    let thickness = ctx.effective_thickness(shape.annotations.thickness);
    let mut next = shape.clone();
    pin_to_thickness(&mut next, thickness);

    if let (Some(template), Geometry::Path(_)) = (&shape.template, &shape.geometry) {
        next.geometry = Geometry::Path(realize_template(template, thickness, ctx)?);
    }
    Ok(next)
}
