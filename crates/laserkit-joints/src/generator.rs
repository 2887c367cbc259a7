//! Joint kinds and the generator trait.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use laserkit_core::{FabricationContext, JointSettings};
use laserkit_path::{Edge, PathCommand, Position};

use crate::finger::{CompactFingerJoint, FingerJoint};
use crate::flap::FlapJoint;
use crate::pattern::{JointParams, JointPattern};
use crate::tslot::TSlotJoint;

/// Replaces a straight edge with a joint pattern.
///
/// Output starts with an absolute move to the edge start followed by
/// relative commands whose total displacement equals the edge vector.
/// Zero-length edges and a zero count produce `None`.
pub trait JointGenerator {
    fn generate(
        &self,
        edge: &Edge,
        params: &JointParams,
        ctx: &FabricationContext,
    ) -> Option<JointPattern>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JointKind {
    #[default]
    None,
    Finger,
    FingerCompact,
    Flap,
    #[serde(rename = "tslot")]
    TSlot,
}

impl JointKind {
    pub const ALL: [JointKind; 5] = [
        JointKind::None,
        JointKind::Finger,
        JointKind::FingerCompact,
        JointKind::Flap,
        JointKind::TSlot,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JointKind::None => "none",
            JointKind::Finger => "finger",
            JointKind::FingerCompact => "finger-compact",
            JointKind::Flap => "flap",
            JointKind::TSlot => "tslot",
        }
    }

    /// Generator parameters for this kind at the given thickness.
    pub fn params(
        self,
        direction: JointDirection,
        thickness: f64,
        settings: &JointSettings,
    ) -> JointParams {
        let count = match self {
            JointKind::Flap => settings.flap_count,
            _ => settings.finger_count,
        };
        JointParams::new(settings.gap, direction.sign() * thickness, count)
    }

    pub fn generator(self, settings: &JointSettings) -> Box<dyn JointGenerator> {
        match self {
            JointKind::None => Box::new(StraightJoint),
            JointKind::Finger => Box::new(FingerJoint),
            JointKind::FingerCompact => Box::new(CompactFingerJoint),
            JointKind::Flap => Box::new(FlapJoint),
            JointKind::TSlot => Box::new(TSlotJoint::new(settings.tslot)),
        }
    }
}

impl fmt::Display for JointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JointKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JointKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown joint type: {}", s))
    }
}

/// Which side of the edge the tabs stick out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JointDirection {
    #[default]
    Inside,
    Outside,
}

impl JointDirection {
    pub fn sign(self) -> f64 {
        match self {
            JointDirection::Inside => -1.0,
            JointDirection::Outside => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JointDirection::Inside => "inside",
            JointDirection::Outside => "outside",
        }
    }
}

impl fmt::Display for JointDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JointDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "inside" => Ok(JointDirection::Inside),
            "outside" => Ok(JointDirection::Outside),
            other => Err(format!("Unknown joint direction: {}", other)),
        }
    }
}

/// `M start l width height` with no template.
pub struct StraightJoint;

impl JointGenerator for StraightJoint {
    fn generate(
        &self,
        edge: &Edge,
        _params: &JointParams,
        _ctx: &FabricationContext,
    ) -> Option<JointPattern> {
        if edge.is_degenerate() {
            return None;
        }
        Some(JointPattern {
            path: straight_path(edge),
            template: None,
        })
    }
}

pub(crate) fn straight_path(edge: &Edge) -> Vec<PathCommand> {
    vec![
        PathCommand::move_to(Position::Absolute, edge.start.x, edge.start.y),
        PathCommand::line_to(Position::Relative, edge.width, edge.height),
    ]
}

/// Generate the joint of `kind` along `edge`.
pub fn create_joint(
    kind: JointKind,
    direction: JointDirection,
    edge: &Edge,
    thickness: f64,
    settings: &JointSettings,
    ctx: &FabricationContext,
) -> Option<JointPattern> {
    let params = kind.params(direction, thickness, settings);
    let pattern = kind.generator(settings).generate(edge, &params, ctx);
    if pattern.is_none() {
        tracing::debug!(
            "No {} joint for edge of length {} (gap {}, count {})",
            kind,
            edge.length,
            params.gap,
            params.count
        );
    }
    pattern
}
