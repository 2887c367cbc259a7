//! # LaserKit Core
//!
//! Core types shared by every LaserKit crate: the fabrication context
//! (material thickness, kerf, cumulative scale), engine settings, planar
//! points and unit-suffixed lengths.

pub mod context;
pub mod error;
pub mod geometry;
pub mod overrides;
pub mod settings;
pub mod units;

pub use context::{FabricationContext, DEFAULT_KERF, DEFAULT_MATERIAL_THICKNESS};
pub use error::{CoreError, CoreResult, ParameterError, ParameterResult};
pub use geometry::Point;
pub use overrides::LoadOverrides;
pub use settings::{DocumentDefaults, EngineSettings, JointSettings, TSlotSettings};
pub use units::Length;
