//! Error types shared across Remix crates.

use std::path::PathBuf;

/// Top-level error type for Remix operations.
///
/// The first two variants fail a whole batch before any planning starts.
/// `Distribution` and `Compilation` only ever fail the variant they belong to
/// and are collected next to the successful plans.
#[derive(Debug, thiserror::Error)]
pub enum RemixError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Insufficient input: {message}")]
    InsufficientInput { message: String },

    #[error("Distribution error: {message}")]
    Distribution { message: String },

    #[error("Compilation error: {message}")]
    Compilation { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using RemixError.
pub type RemixResult<T> = Result<T, RemixError>;

impl RemixError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }

    pub fn insufficient_input(msg: impl Into<String>) -> Self {
        Self::InsufficientInput {
            message: msg.into(),
        }
    }

    pub fn distribution(msg: impl Into<String>) -> Self {
        Self::Distribution {
            message: msg.into(),
        }
    }

    pub fn compilation(msg: impl Into<String>) -> Self {
        Self::Compilation {
            message: msg.into(),
        }
    }

    /// Whether this error aborts the whole batch rather than a single variant.
    pub fn is_batch_fatal(&self) -> bool {
        !matches!(self, Self::Distribution { .. } | Self::Compilation { .. })
    }
}
