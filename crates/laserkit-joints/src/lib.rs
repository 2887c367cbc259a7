//! # LaserKit Joints
//!
//! Generators that replace a straight edge with an interlocking joint
//! pattern: finger, compact finger, flap, t-slot, or a plain line.
//!
//! Generators work on the unscaled design-space edge. Each returns the
//! concrete path together with a template whose tab depths are expressions
//! of the material thickness, so a later thickness change only re-evaluates
//! the template.

pub mod finger;
pub mod flap;
pub mod generator;
pub mod pattern;
pub mod tslot;

pub use finger::{CompactFingerJoint, FingerJoint};
pub use flap::FlapJoint;
pub use generator::{create_joint, JointDirection, JointGenerator, JointKind, StraightJoint};
pub use pattern::{JointParams, JointPattern, Linear, PatternBuilder};
pub use tslot::TSlotJoint;
