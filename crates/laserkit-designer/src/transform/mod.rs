//! Thickness, scale and kerf passes
//!
//! Each pass maps one shape to a new shape value. The session runs them over
//! the whole document and keeps the previous value of any shape whose pass
//! fails.

pub mod kerf;
pub mod scale;
pub mod thickness;

pub use kerf::{apply_kerf, apply_kerf_mask, change_segment_length, KerfCode};
pub use scale::{scale_commands, scale_shape};
pub use thickness::{apply_thickness, pin_to_thickness, realize_template};
