//! Fabrication annotations
//!
//! Shapes carry their fabrication metadata as attributes in the LaserSVG
//! namespace (`http://www.heller-web.net/lasersvg/`, usually bound to the
//! `laser` prefix). They are parsed once into [`ShapeAnnotations`] and written
//! back in a fixed order, so a load/save cycle is stable.
//!
//! The `template` attribute is not part of this struct; the shape keeps the
//! parsed template itself.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use laserkit_joints::{JointDirection, JointKind};
use laserkit_path::format_number;

use crate::error::{DesignerError, DesignerResult};

pub const LASER_NAMESPACE: &str = "http://www.heller-web.net/lasersvg/";
pub const DEFAULT_PREFIX: &str = "laser";

/// Which rectangle dimension follows the material thickness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThicknessAdjust {
    #[default]
    None,
    Width,
    Height,
    Both,
}

impl ThicknessAdjust {
    pub fn as_str(self) -> &'static str {
        match self {
            ThicknessAdjust::None => "none",
            ThicknessAdjust::Width => "width",
            ThicknessAdjust::Height => "height",
            ThicknessAdjust::Both => "both",
        }
    }

    pub fn adjusts_width(self) -> bool {
        matches!(self, ThicknessAdjust::Width | ThicknessAdjust::Both)
    }

    pub fn adjusts_height(self) -> bool {
        matches!(self, ThicknessAdjust::Height | ThicknessAdjust::Both)
    }
}

impl FromStr for ThicknessAdjust {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none" => Ok(ThicknessAdjust::None),
            "width" => Ok(ThicknessAdjust::Width),
            "height" => Ok(ThicknessAdjust::Height),
            "both" => Ok(ThicknessAdjust::Both),
            other => Err(format!("Unknown thickness-adjust: {}", other)),
        }
    }
}

/// The point of a rectangle that stays fixed when a thickness-adjusted
/// dimension changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Origin {
    #[default]
    TopLeft,
    Bottom,
    Right,
    TopRight,
    BottomRight,
    Center,
}

impl Origin {
    pub fn as_str(self) -> &'static str {
        match self {
            Origin::TopLeft => "top-left",
            Origin::Bottom => "bottom",
            Origin::Right => "right",
            Origin::TopRight => "top-right",
            Origin::BottomRight => "bottom-right",
            Origin::Center => "center",
        }
    }

    /// Anchor point of the rectangle `(x, y, width, height)`.
    pub fn anchor(self, x: f64, y: f64, width: f64, height: f64) -> (f64, f64) {
        match self {
            Origin::TopLeft => (x, y),
            Origin::Bottom => (x, y + height),
            Origin::Right | Origin::TopRight => (x + width, y),
            Origin::BottomRight => (x + width, y + height),
            Origin::Center => (x + width / 2.0, y + height / 2.0),
        }
    }

    /// Top-left corner that puts this origin's anchor at `anchor`.
    pub fn position_for(self, anchor: (f64, f64), width: f64, height: f64) -> (f64, f64) {
        let (ax, ay) = anchor;
        match self {
            Origin::TopLeft => (ax, ay),
            Origin::Bottom => (ax, ay - height),
            Origin::Right | Origin::TopRight => (ax - width, ay),
            Origin::BottomRight => (ax - width, ay - height),
            Origin::Center => (ax - width / 2.0, ay - height / 2.0),
        }
    }
}

impl FromStr for Origin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "default" | "top-left" | "top" | "left" => Ok(Origin::TopLeft),
            "bottom" | "bottom-left" => Ok(Origin::Bottom),
            "right" => Ok(Origin::Right),
            "top-right" => Ok(Origin::TopRight),
            "bottom-right" => Ok(Origin::BottomRight),
            "center" => Ok(Origin::Center),
            other => Err(format!("Unknown origin: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KerfAdjust {
    Grow,
    Shrink,
}

impl KerfAdjust {
    pub fn as_str(self) -> &'static str {
        match self {
            KerfAdjust::Grow => "grow",
            KerfAdjust::Shrink => "shrink",
        }
    }

    /// Signed offset applied for a kerf of `kerf`.
    pub fn offset(self, kerf: f64) -> f64 {
        match self {
            KerfAdjust::Grow => kerf,
            KerfAdjust::Shrink => -kerf,
        }
    }
}

impl FromStr for KerfAdjust {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "grow" => Ok(KerfAdjust::Grow),
            "shrink" => Ok(KerfAdjust::Shrink),
            other => Err(format!("Unknown kerf-adjust: {}", other)),
        }
    }
}

/// Rectangle side, in the order the normaliser emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Right => "right",
            Side::Bottom => "bottom",
            Side::Left => "left",
        }
    }

    fn index(self) -> usize {
        match self {
            Side::Top => 0,
            Side::Right => 1,
            Side::Bottom => 2,
            Side::Left => 3,
        }
    }

    fn from_name(name: &str) -> Option<Side> {
        Side::ALL.into_iter().find(|s| s.as_str() == name)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Joint marker with its optional type and direction.
///
/// The marker value is kept verbatim; only its presence matters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JointAnnotation {
    pub marker: Option<String>,
    pub kind: Option<JointKind>,
    pub direction: Option<JointDirection>,
}

impl JointAnnotation {
    pub fn is_marked(&self) -> bool {
        self.marker.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.marker.is_none() && self.kind.is_none() && self.direction.is_none()
    }

    fn set(&mut self, suffix: &str, name: &str, value: &str) -> DesignerResult<()> {
        match suffix {
            "" => self.marker = Some(value.to_string()),
            "-type" => {
                self.kind = Some(value.parse().map_err(|_| DesignerError::invalid(name, value))?)
            }
            "-direction" => {
                self.direction =
                    Some(value.parse().map_err(|_| DesignerError::invalid(name, value))?)
            }
            _ => return Err(DesignerError::invalid(name, value)),
        }
        Ok(())
    }

    fn write(&self, base: &str, out: &mut Vec<(String, String)>) {
        if let Some(marker) = &self.marker {
            out.push((base.to_string(), marker.clone()));
        }
        if let Some(kind) = self.kind {
            out.push((format!("{}-type", base), kind.to_string()));
        }
        if let Some(direction) = self.direction {
            out.push((format!("{}-direction", base), direction.to_string()));
        }
    }
}

/// Every LaserSVG annotation a shape may carry, except the template.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapeAnnotations {
    /// Local override of the document material thickness.
    pub thickness: Option<f64>,
    pub thickness_adjust: ThicknessAdjust,
    pub origin: Option<Origin>,
    /// Cached anchor, written by the engine on the first thickness update.
    pub origin_x: Option<f64>,
    pub origin_y: Option<f64>,
    pub joint: JointAnnotation,
    pub sides: [JointAnnotation; 4],
    pub kerf_adjust: Option<KerfAdjust>,
    pub kerf_mask: Option<String>,
    pub resize_lock: bool,
    /// Namespaced attributes this model does not interpret.
    pub extra: BTreeMap<String, String>,
}

impl ShapeAnnotations {
    /// Move every `prefix:`-qualified attribute out of `attributes` and into
    /// a typed annotation set. `prefix:template` is left in place.
    ///
    /// Values that cannot be interpreted are logged and dropped.
    pub fn extract(prefix: &str, attributes: &mut BTreeMap<String, String>) -> Self {
        let qualifier = format!("{}:", prefix);
        let names: Vec<String> = attributes
            .keys()
            .filter(|k| k.starts_with(&qualifier) && &k[qualifier.len()..] != "template")
            .cloned()
            .collect();

        let mut annotations = Self::default();
        for name in names {
            let Some(value) = attributes.remove(&name) else {
                continue;
            };
            if let Err(e) = annotations.set(&name[qualifier.len()..], &value) {
                tracing::warn!("Ignoring annotation: {}", e);
            }
        }
        annotations
    }

    /// Set one annotation by its local name (without prefix).
    pub fn set(&mut self, name: &str, value: &str) -> DesignerResult<()> {
        let number = || -> DesignerResult<f64> {
            value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| DesignerError::invalid(name, value))
        };
        let invalid = |_| DesignerError::invalid(name, value);

        match name {
            "thickness" => {
                let t = number()?;
                if t <= 0.0 {
                    return Err(DesignerError::invalid(name, value));
                }
                self.thickness = Some(t);
            }
            "thickness-adjust" => self.thickness_adjust = value.parse().map_err(invalid)?,
            "origin" => self.origin = Some(value.parse().map_err(invalid)?),
            "origin-x" => self.origin_x = Some(number()?),
            "origin-y" => self.origin_y = Some(number()?),
            "kerf-adjust" => self.kerf_adjust = Some(value.parse().map_err(invalid)?),
            "kerf-mask" => self.kerf_mask = Some(value.to_string()),
            "resizeLock" => match value.trim() {
                "lock" => self.resize_lock = true,
                "none" | "" => self.resize_lock = false,
                _ => return Err(DesignerError::invalid(name, value)),
            },
            _ => {
                if let Some(rest) = name.strip_prefix("joint") {
                    return self.set_joint(rest, name, value);
                }
                self.extra.insert(name.to_string(), value.to_string());
            }
        }
        Ok(())
    }

    fn set_joint(&mut self, rest: &str, name: &str, value: &str) -> DesignerResult<()> {
        if matches!(rest, "" | "-type" | "-direction") {
            return self.joint.set(rest, name, value);
        }
        let Some(rest) = rest.strip_prefix('-') else {
            self.extra.insert(name.to_string(), value.to_string());
            return Ok(());
        };
        let (side, suffix) = match rest.find('-') {
            Some(i) => rest.split_at(i),
            None => (rest, ""),
        };
        match Side::from_name(side) {
            Some(side) => self.sides[side.index()].set(suffix, name, value),
            None => {
                self.extra.insert(name.to_string(), value.to_string());
                Ok(())
            }
        }
    }

    pub fn side(&self, side: Side) -> &JointAnnotation {
        &self.sides[side.index()]
    }

    pub fn side_mut(&mut self, side: Side) -> &mut JointAnnotation {
        &mut self.sides[side.index()]
    }

    /// Whether any rectangle side carries a joint marker.
    pub fn has_side_joints(&self) -> bool {
        self.sides.iter().any(JointAnnotation::is_marked)
    }

    /// Local names and values in their fixed output order.
    pub fn to_attributes(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Some(t) = self.thickness {
            out.push(("thickness".to_string(), format_number(t)));
        }
        if self.thickness_adjust != ThicknessAdjust::None {
            out.push((
                "thickness-adjust".to_string(),
                self.thickness_adjust.as_str().to_string(),
            ));
        }
        if let Some(origin) = self.origin {
            out.push(("origin".to_string(), origin.as_str().to_string()));
        }
        if let Some(x) = self.origin_x {
            out.push(("origin-x".to_string(), format_number(x)));
        }
        if let Some(y) = self.origin_y {
            out.push(("origin-y".to_string(), format_number(y)));
        }
        self.joint.write("joint", &mut out);
        for side in Side::ALL {
            self.side(side).write(&format!("joint-{}", side), &mut out);
        }
        if let Some(adjust) = self.kerf_adjust {
            out.push(("kerf-adjust".to_string(), adjust.as_str().to_string()));
        }
        if let Some(mask) = &self.kerf_mask {
            out.push(("kerf-mask".to_string(), mask.clone()));
        }
        if self.resize_lock {
            out.push(("resizeLock".to_string(), "lock".to_string()));
        }
        out.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        out
    }
}
