//! Error types shared by every flatstore layer.

use crate::path::{Path, PathError};

/// Errors from codec, connector and document operations.
///
/// `NotFound` and `Validation` are expected conditions callers handle
/// (e.g. "create on first use"). `Io` fails the in-flight operation only.
/// Nothing is retried.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("path not found: {path}")]
    NotFound { path: Path },

    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ambiguous container at {path}: both array and object children are stored")]
    AmbiguousContainer { path: Path },

    #[error("{0}")]
    InvalidPath(#[from] PathError),

    #[error("corrupt store: {message}")]
    Corrupt { message: String },

    #[error("encode error: {message}")]
    Encode { message: String },

    #[error("store is closed")]
    Closed,
}

impl Error {
    pub fn not_found(path: &Path) -> Self {
        Error::NotFound { path: path.clone() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        Error::Corrupt {
            message: message.into(),
        }
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Error::Encode {
            message: message.into(),
        }
    }

    /// Whether this is the recoverable "nothing stored there" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
