//! Engine settings
//!
//! Joint generator parameters and document fallback values. Settings are
//! persisted as JSON or TOML, picked by file extension.
//!
//! Settings are organized into sections:
//! - Joint settings (gap, finger and flap counts)
//! - T-slot hardware dimensions
//! - Fallback fabrication parameters for documents that carry none

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::context::{DEFAULT_KERF, DEFAULT_MATERIAL_THICKNESS};
use crate::error::{CoreError, CoreResult, ParameterError};

/// Nut and bolt dimensions used by the t-slot generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TSlotSettings {
    /// Width of the nut flare on each side of the bolt shaft
    pub nut_width: f64,
    /// Depth of the nut pocket
    pub nut_depth: f64,
    /// Bolt shaft diameter
    pub bolt_diameter: f64,
    /// Screw-hole offset from the edge as a fraction of the inset
    pub hole_offset_ratio: f64,
}

impl Default for TSlotSettings {
    fn default() -> Self {
        Self {
            nut_width: 2.0,
            nut_depth: 2.0,
            bolt_diameter: 2.0,
            hole_offset_ratio: 0.75,
        }
    }
}

/// Parameters shared by the joint generators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JointSettings {
    /// Straight run left at both ends of a jointed edge
    pub gap: f64,
    /// Tabs per edge for finger and t-slot joints
    pub finger_count: u32,
    /// Flaps per edge
    pub flap_count: u32,
    pub tslot: TSlotSettings,
}

impl Default for JointSettings {
    fn default() -> Self {
        Self {
            gap: 5.0,
            finger_count: 5,
            flap_count: 2,
            tslot: TSlotSettings::default(),
        }
    }
}

/// Values used when a document does not declare its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentDefaults {
    pub material_thickness: f64,
    pub kerf: f64,
}

impl Default for DocumentDefaults {
    fn default() -> Self {
        Self {
            material_thickness: DEFAULT_MATERIAL_THICKNESS,
            kerf: DEFAULT_KERF,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineSettings {
    pub joints: JointSettings,
    pub defaults: DocumentDefaults,
}

impl EngineSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CoreError::LoadError(format!("{}: {}", path.display(), e)))?;

        let settings: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            return Err(CoreError::UnsupportedFormat(path.display().to_string()));
        };

        settings.validate()?;
        tracing::debug!("Loaded engine settings from {}", path.display());
        Ok(settings)
    }

    pub fn save_to_file(&self, path: &Path) -> CoreResult<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)?
        } else {
            return Err(CoreError::UnsupportedFormat(path.display().to_string()));
        };

        std::fs::write(path, content)
            .map_err(|e| CoreError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    pub fn validate(&self) -> CoreResult<()> {
        let joints = &self.joints;
        if !joints.gap.is_finite() || joints.gap < 0.0 {
            return Err(invalid("joints.gap", "must be >= 0"));
        }
        if joints.finger_count == 0 {
            return Err(invalid("joints.finger_count", "must be > 0"));
        }
        if joints.flap_count == 0 {
            return Err(invalid("joints.flap_count", "must be > 0"));
        }

        let tslot = &joints.tslot;
        if tslot.nut_width <= 0.0 || tslot.nut_depth <= 0.0 || tslot.bolt_diameter <= 0.0 {
            return Err(invalid("joints.tslot", "nut and bolt dimensions must be > 0"));
        }
        if !(0.0..=1.0).contains(&tslot.hole_offset_ratio) {
            return Err(ParameterError::OutOfRange {
                name: "joints.tslot.hole_offset_ratio".to_string(),
                value: tslot.hole_offset_ratio,
                min: 0.0,
                max: 1.0,
            }
            .into());
        }

        if self.defaults.material_thickness <= 0.0 {
            return Err(invalid("defaults.material_thickness", "must be > 0"));
        }
        if self.defaults.kerf < 0.0 {
            return Err(invalid("defaults.kerf", "must be >= 0"));
        }

        Ok(())
    }
}

fn invalid(name: &str, reason: &str) -> CoreError {
    ParameterError::InvalidValue {
        name: name.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
