//! Error types for template parsing and evaluation.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    /// An expression or template string could not be parsed.
    #[error("Cannot parse '{input}': {reason}")]
    Parse { input: String, reason: String },

    /// An expression referenced a name that is neither `thickness` nor a local.
    #[error("Unknown symbol '{0}'")]
    UnknownSymbol(String),

    /// Evaluation produced NaN or infinity.
    #[error("Expression '{expression}' did not evaluate to a finite number")]
    NonFinite { expression: String },

    /// A template command has the wrong number of parameters.
    #[error("Template command '{command}' expects {expected} parameters, found {found}")]
    Shape {
        command: char,
        expected: usize,
        found: usize,
    },
}

pub type TemplateResult<T> = Result<T, TemplateError>;
