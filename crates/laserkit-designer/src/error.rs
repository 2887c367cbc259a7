//! Error types for documents, shapes and the session.

use laserkit_core::{CoreError, ParameterError};
use laserkit_path::PathError;
use laserkit_template::TemplateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DesignerError {
    /// The SVG source could not be read.
    #[error("SVG parse error: {0}")]
    Svg(String),

    /// The document has no `<svg>` root element.
    #[error("Document has no svg root element")]
    MissingRoot,

    /// A shape element lacks a required attribute.
    #[error("<{element}> is missing attribute '{name}'")]
    MissingAttribute { element: String, name: String },

    /// An attribute value could not be interpreted.
    #[error("Invalid value '{value}' for attribute '{name}'")]
    InvalidAttribute { name: String, value: String },

    /// The operation does not apply to this kind of geometry.
    #[error("Unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl DesignerError {
    pub(crate) fn invalid(name: &str, value: &str) -> Self {
        DesignerError::InvalidAttribute {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

pub type DesignerResult<T> = Result<T, DesignerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DesignerError::MissingAttribute {
            element: "rect".to_string(),
            name: "width".to_string(),
        };
        assert_eq!(err.to_string(), "<rect> is missing attribute 'width'");
        assert_eq!(
            DesignerError::invalid("laser:origin", "middle").to_string(),
            "Invalid value 'middle' for attribute 'laser:origin'"
        );
    }

    #[test]
    fn test_wraps_lower_errors() {
        let err: DesignerError = PathError::InvalidPath("empty".to_string()).into();
        assert_eq!(err.to_string(), "Invalid path: empty");
        let err: DesignerError = TemplateError::UnknownSymbol("w".to_string()).into();
        assert!(matches!(err, DesignerError::Template(_)));
    }
}
