//! Fabrication context
//!
//! The document-level parameters every engine operation works against:
//! material thickness, kerf and the cumulative scaling factor. A session owns
//! exactly one context and passes it explicitly to the joint generators and
//! transform passes.

use serde::{Deserialize, Serialize};

use crate::error::{ParameterError, ParameterResult};

pub const DEFAULT_MATERIAL_THICKNESS: f64 = 4.0;
pub const DEFAULT_KERF: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FabricationContext {
    /// Material thickness in mm.
    pub material_thickness: f64,
    /// Width of material removed by the beam, in mm.
    pub kerf: f64,
    /// Product of every scale factor applied so far.
    pub scaling_factor: f64,
}

impl Default for FabricationContext {
    fn default() -> Self {
        Self {
            material_thickness: DEFAULT_MATERIAL_THICKNESS,
            kerf: DEFAULT_KERF,
            scaling_factor: 1.0,
        }
    }
}

impl FabricationContext {
    pub fn new(material_thickness: f64, kerf: f64) -> ParameterResult<Self> {
        let mut ctx = Self::default();
        ctx.set_material_thickness(material_thickness)?;
        ctx.set_kerf(kerf)?;
        Ok(ctx)
    }

    pub fn set_material_thickness(&mut self, thickness: f64) -> ParameterResult<()> {
        if !thickness.is_finite() || thickness <= 0.0 {
            return Err(ParameterError::InvalidValue {
                name: "material-thickness".to_string(),
                reason: format!("must be a positive number, got {}", thickness),
            });
        }
        self.material_thickness = thickness;
        Ok(())
    }

    pub fn set_kerf(&mut self, kerf: f64) -> ParameterResult<()> {
        if !kerf.is_finite() || kerf < 0.0 {
            return Err(ParameterError::InvalidValue {
                name: "kerf".to_string(),
                reason: format!("must be a non-negative number, got {}", kerf),
            });
        }
        self.kerf = kerf;
        Ok(())
    }

    /// Compound `factor` into the cumulative scaling factor.
    ///
    /// Calling this twice with 2.0 leaves the context at 4.0.
    pub fn compound_scale(&mut self, factor: f64) -> ParameterResult<()> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ParameterError::InvalidValue {
                name: "scale".to_string(),
                reason: format!("must be a positive number, got {}", factor),
            });
        }
        self.scaling_factor *= factor;
        Ok(())
    }

    /// Material thickness to use for a shape, honouring a local override.
    pub fn effective_thickness(&self, local: Option<f64>) -> f64 {
        local.unwrap_or(self.material_thickness)
    }

    /// Convert a drawing-space thickness into the unscaled design space that
    /// templates are stored in.
    pub fn design_thickness(&self, thickness: f64) -> f64 {
        thickness / self.scaling_factor
    }
}
