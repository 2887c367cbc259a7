//! Load-time overrides
//!
//! A host can pass `thickness`, `kerf` and `scale` (a percentage) as
//! `key=value` pairs, e.g. `?thickness=3&kerf=0.15&scale=150`. They are
//! applied after the document has been loaded.

use serde::{Deserialize, Serialize};

use crate::error::{ParameterError, ParameterResult};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LoadOverrides {
    pub thickness: Option<f64>,
    pub kerf: Option<f64>,
    /// Scale in percent; 100 leaves the drawing unchanged.
    pub scale_percent: Option<f64>,
}

impl LoadOverrides {
    pub fn from_query(query: &str) -> ParameterResult<Self> {
        let mut overrides = Self::default();
        let query = query.trim().trim_start_matches('?');

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "thickness" => overrides.thickness = Some(parse_number(key, value)?),
                "kerf" => overrides.kerf = Some(parse_number(key, value)?),
                "scale" => overrides.scale_percent = Some(parse_number(key, value)?),
                other => tracing::debug!("Ignoring unknown load parameter '{}'", other),
            }
        }

        Ok(overrides)
    }

    /// The scale override as a multiplication factor.
    pub fn scale_factor(&self) -> Option<f64> {
        self.scale_percent.map(|p| p / 100.0)
    }

    pub fn is_empty(&self) -> bool {
        self.thickness.is_none() && self.kerf.is_none() && self.scale_percent.is_none()
    }
}

fn parse_number(name: &str, value: &str) -> ParameterResult<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParameterError::Unparsable {
            name: name.to_string(),
            input: value.to_string(),
        })
}
