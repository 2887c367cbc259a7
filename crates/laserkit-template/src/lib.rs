//! # LaserKit Template
//!
//! Thickness-parameterized path templates: the `{...}` expression language,
//! the template model, and conversions between concrete paths and templates.
//!
//! Evaluating a template at the thickness it was derived from reproduces the
//! concrete path it was derived from.

pub mod algebra;
pub mod error;
pub mod expr;
pub mod template;

pub use algebra::{apply_marks, evaluate, to_template, ParamMark};
pub use error::{TemplateError, TemplateResult};
pub use expr::Program;
pub use template::{Template, TemplateCommand, TemplateParam};
