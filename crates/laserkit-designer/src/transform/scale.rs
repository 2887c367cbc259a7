//! Scale pass.

use laserkit_core::FabricationContext;
use laserkit_path::{PathCommand, Verb};

use crate::error::DesignerResult;
use crate::shape::{Geometry, Shape};
use crate::transform::thickness::{pin_to_thickness, realize_template};

/// Multiply every coordinate and radius by `factor`. Arc rotation and
/// flags are left alone.
pub fn scale_commands(commands: &[PathCommand], factor: f64) -> Vec<PathCommand> {
    commands
        .iter()
        .map(|cmd| {
            let mut scaled = cmd.clone();
            for (index, value) in scaled.params.iter_mut().enumerate() {
                let fixed = cmd.verb == Verb::Arc && matches!(index, 2..=4);
                if !fixed {
                    *value *= factor;
                }
            }
            scaled
        })
        .collect()
}

/// Scale one shape by `factor`.
///
/// `ctx` must already include `factor` in its cumulative scaling factor.
/// Locked shapes are returned unchanged, thickness-adjusted dimensions stay
/// at the material thickness and template paths are regenerated at the new
/// scale rather than multiplied.
pub fn scale_shape(shape: &Shape, factor: f64, ctx: &FabricationContext) -> DesignerResult<Shape> {
    if shape.annotations.resize_lock {
        tracing::debug!("Not scaling locked shape {}", shape.label());
        return Ok(shape.clone());
    }

    let mut next = shape.clone();
    let a = &mut next.annotations;
    a.origin_x = a.origin_x.map(|v| v * factor);
    a.origin_y = a.origin_y.map(|v| v * factor);

    match &mut next.geometry {
        Geometry::Rect(rect) => {
            rect.x *= factor;
            rect.y *= factor;
            rect.width *= factor;
            rect.height *= factor;
            rect.rx = rect.rx.map(|v| v * factor);
            rect.ry = rect.ry.map(|v| v * factor);
        }
        Geometry::Circle { cx, cy, r } => {
            *cx *= factor;
            *cy *= factor;
            *r *= factor;
        }
        Geometry::Ellipse { cx, cy, rx, ry } => {
            *cx *= factor;
            *cy *= factor;
            *rx *= factor;
            *ry *= factor;
        }
        Geometry::Path(commands) => {
            *commands = match &shape.template {
                Some(template) => realize_template(
                    template,
                    ctx.effective_thickness(shape.annotations.thickness),
                    ctx,
                )?,
                None => scale_commands(commands, factor),
            };
        }
    }

    pin_to_thickness(&mut next, ctx.effective_thickness(shape.annotations.thickness));
    Ok(next)
}
