//! Joint assignment for document paths
//!
//! A path marked with `joint` and a `joint-type` is rebuilt by the matching
//! generator. The edge it follows comes from the stored template when there
//! is one, so regenerating an already jointed path (with another kind,
//! direction or thickness) always starts from the original straight edge.
//! Without a template the current geometry is used, mapped back to design
//! space.

use laserkit_core::{FabricationContext, JointSettings};
use laserkit_joints::create_joint;
use laserkit_path::Edge;
use laserkit_template::evaluate;

use crate::error::{DesignerError, DesignerResult};
use crate::shape::{Geometry, JointState, Shape};
use crate::transform::scale_commands;

/// The unscaled edge a joint on `shape` should span.
pub fn design_edge(shape: &Shape, ctx: &FabricationContext) -> DesignerResult<Edge> {
    let Geometry::Path(commands) = &shape.geometry else {
        return Err(DesignerError::UnsupportedGeometry(format!(
            "joints need a path, {} is a {}",
            shape.label(),
            shape.geometry.tag()
        )));
    };

    let design = match &shape.template {
        Some(template) => {
            let thickness = ctx.effective_thickness(shape.annotations.thickness);
            evaluate(template, ctx.design_thickness(thickness))?
        }
        None => scale_commands(commands, 1.0 / ctx.scaling_factor),
    };

    Edge::from_commands(&design).ok_or_else(|| {
        DesignerError::UnsupportedGeometry(format!("{} has no edge to joint", shape.label()))
    })
}

/// Regenerate the joint of `shape`.
///
/// `Ok(None)` when the shape asks for no joint or the generator declines
/// the edge (zero length, no room for the tabs).
pub fn apply_joint(
    shape: &Shape,
    settings: &JointSettings,
    ctx: &FabricationContext,
) -> DesignerResult<Option<Shape>> {
    let joint = &shape.annotations.joint;
    let Some(kind) = joint.kind.filter(|_| joint.is_marked()) else {
        return Ok(None);
    };
    let direction = joint.direction.unwrap_or_default();

    let edge = design_edge(shape, ctx)?;
    let thickness = ctx.design_thickness(ctx.effective_thickness(shape.annotations.thickness));
    let Some(pattern) = create_joint(kind, direction, &edge, thickness, settings, ctx) else {
        return Ok(None);
    };

    let mut next = shape.with_geometry(Geometry::Path(scale_commands(
        &pattern.path,
        ctx.scaling_factor,
    )));
    next.template = pattern.template;
    next.joint_state = JointState::Jointed { kind, direction };
    tracing::debug!("Applied {} {} joint to {}", direction, kind, shape.label());
    Ok(Some(next))
}
