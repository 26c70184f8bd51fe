//! Error types for canonical resolution

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the dataset, plugin packs, or querying the result
#[derive(Debug, Error)]
pub enum CanonicalError {
    #[error("Unsupported plugin format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Plugin directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Malformed source {path}: {reason}")]
    MalformedSource { path: PathBuf, reason: String },

    #[error("Failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown category: {category}")]
    UnknownCategory { category: String },
}

impl CanonicalError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::MalformedSource {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CanonicalError>;
