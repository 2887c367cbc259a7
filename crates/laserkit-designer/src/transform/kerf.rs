//! Kerf compensation
//!
//! Rectangles and circles marked `kerf-adjust` grow or shrink by the full
//! kerf. Paths carry a `kerf-mask` with one code per drawing command after
//! the initial move: `s`/`g` shorten or lengthen the segment by half the
//! kerf, `S`/`G` by the whole kerf, anything else leaves it alone.

use laserkit_path::{PathCommand, Position, Verb};

use crate::shape::{Geometry, Shape};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KerfCode {
    ShrinkHalf,
    GrowHalf,
    Shrink,
    Grow,
    Keep,
}

impl KerfCode {
    pub fn from_token(token: &str) -> Self {
        match token {
            "s" => KerfCode::ShrinkHalf,
            "g" => KerfCode::GrowHalf,
            "S" => KerfCode::Shrink,
            "G" => KerfCode::Grow,
            _ => KerfCode::Keep,
        }
    }

    /// Length change for a kerf of `kerf`.
    pub fn offset(self, kerf: f64) -> f64 {
        match self {
            KerfCode::ShrinkHalf => -kerf / 2.0,
            KerfCode::GrowHalf => kerf / 2.0,
            KerfCode::Shrink => -kerf,
            KerfCode::Grow => kerf,
            KerfCode::Keep => 0.0,
        }
    }
}

fn round5(value: f64) -> f64 {
    (value * 100_000.0).round() / 100_000.0
}

/// Lengthen a relative line by `offset` along its own direction.
///
/// Returns `None` for commands that are not relative `l`, `h` or `v`.
pub fn change_segment_length(command: &PathCommand, offset: f64) -> Option<PathCommand> {
    if command.position != Position::Relative {
        return None;
    }
    let mut next = command.clone();
    let p = &mut next.params;
    match command.verb {
        Verb::Line => {
            let angle = p[1].atan2(p[0]);
            p[0] += round5(angle.cos()) * offset;
            p[1] += round5(angle.sin()) * offset;
        }
        Verb::Horizontal => p[0] += round5(0f64.atan2(p[0]).cos()) * offset,
        Verb::Vertical => p[0] += round5(p[0].atan2(0.0).sin()) * offset,
        _ => return None,
    }
    Some(next)
}

/// Apply a kerf mask to `commands`.
///
/// `None` if the mask does not have exactly one code per command after the
/// first.
pub fn apply_kerf_mask(commands: &[PathCommand], mask: &str, kerf: f64) -> Option<Vec<PathCommand>> {
    let codes: Vec<KerfCode> = mask.split_whitespace().map(KerfCode::from_token).collect();
    if codes.len() + 1 != commands.len() {
        return None;
    }

    let mut out = commands.to_vec();
    for (index, code) in codes.into_iter().enumerate() {
        if code == KerfCode::Keep {
            continue;
        }
        let target = &mut out[index + 1];
        match change_segment_length(target, code.offset(kerf)) {
            Some(changed) => *target = changed,
            None => tracing::debug!(
                "Kerf code on unsupported command '{}' at index {}",
                target.letter(),
                index + 1
            ),
        }
    }
    Some(out)
}

/// Kerf-compensated copy of `shape`.
pub fn apply_kerf(shape: &Shape, kerf: f64) -> Shape {
    if let Some(adjust) = shape.annotations.kerf_adjust {
        let offset = adjust.offset(kerf);
        let mut next = shape.clone();
        match &mut next.geometry {
            Geometry::Rect(rect) => {
                rect.x -= offset / 2.0;
                rect.y -= offset / 2.0;
                rect.width += offset;
                rect.height += offset;
            }
            Geometry::Circle { r, .. } => *r += offset,
            other => tracing::debug!("kerf-adjust ignored on <{}>", other.tag()),
        }
        return next;
    }

    if let (Some(mask), Geometry::Path(commands)) = (&shape.annotations.kerf_mask, &shape.geometry) {
        return match apply_kerf_mask(commands, mask, kerf) {
            Some(adjusted) => shape.with_geometry(Geometry::Path(adjusted)),
            None => {
                tracing::warn!(
                    "Kerf mask of {} has {} codes for {} segments, leaving it unchanged",
                    shape.label(),
                    mask.split_whitespace().count(),
                    commands.len().saturating_sub(1)
                );
                shape.clone()
            }
        };
    }

    shape.clone()
}
