//! # LaserKit Designer
//!
//! Annotated SVG documents and the fabrication session that edits them.
//!
//! A document is parsed into shapes carrying laser annotations (material
//! thickness overrides, origin anchors, joint markers, kerf handling) and
//! optional thickness templates. The [`FabricationSession`] applies the
//! thickness, scale and kerf passes, splits jointed rectangles into edges,
//! generates joints and produces the display, save and export images.

pub mod annotations;
pub mod document;
pub mod error;
pub mod highlight;
pub mod jointing;
pub mod normalizer;
pub mod session;
pub mod shape;
pub mod transform;

pub use annotations::{
    JointAnnotation, KerfAdjust, Origin, ShapeAnnotations, Side, ThicknessAdjust, DEFAULT_PREFIX,
    LASER_NAMESPACE,
};
pub use document::{Document, Element, Group, Node, TransformOp, ViewBox};
pub use error::{DesignerError, DesignerResult};
pub use highlight::{Highlight, HighlightTarget, LENGTH_HIGHLIGHT_CLASS};
pub use jointing::{apply_joint, design_edge};
pub use normalizer::normalize_rect;
pub use session::{
    DocumentSummary, FabricationSession, HostCallbacks, JointSummary, NoHost, SELECTION_TAG,
};
pub use shape::{Geometry, JointState, Rect, Shape, ShapeId};
pub use transform::{apply_kerf, apply_thickness, scale_shape, KerfCode};
