//! Error types for path data.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    /// Path data could not be tokenized or a command had bad parameters.
    #[error("Malformed path data at offset {position}: {reason}")]
    Malformed { position: usize, reason: String },

    /// Path data parsed but does not describe a usable path.
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

pub type PathResult<T> = Result<T, PathError>;
