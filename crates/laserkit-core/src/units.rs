//! Unit-suffixed lengths
//!
//! Root `width`/`height` attributes carry a unit suffix (`100mm`, `4in`,
//! `300`). Scaling keeps the suffix and only touches the number.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParameterError;

/// A number followed by an optional unit suffix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Length {
    pub value: f64,
    pub unit: String,
}

impl Length {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            value: self.value * factor,
            unit: self.unit.clone(),
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

impl FromStr for Length {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let bytes = input.as_bytes();
        let mut end = 0;
        while end < bytes.len() {
            let c = bytes[end];
            let exponent = (c == b'e' || c == b'E')
                && bytes
                    .get(end + 1)
                    .is_some_and(|n| n.is_ascii_digit() || *n == b'-' || *n == b'+');
            let sign = (c == b'-' || c == b'+') && (end == 0 || matches!(bytes[end - 1], b'e' | b'E'));
            if c.is_ascii_digit() || c == b'.' || exponent || sign {
                end += 1;
            } else {
                break;
            }
        }
        let (number, unit) = input.split_at(end);
        let value = number.parse::<f64>().map_err(|_| ParameterError::Unparsable {
            name: "length".to_string(),
            input: s.to_string(),
        })?;
        Ok(Self::new(value, unit.trim()))
    }
}
