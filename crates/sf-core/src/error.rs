//! Error types for media collaborators

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while decoding or probing a media file
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Media file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Required tool '{command}' is not installed or not in PATH")]
    CommandMissing { command: String },

    #[error("'{command}' failed (exit status {status:?}): {stderr}")]
    CommandFailed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Invalid probe output for {path}: {reason}")]
    InvalidProbe { path: String, reason: String },

    #[error("Failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("Unsupported media: {0}")]
    Unsupported(String),

    #[error("Sample rate conversion failed: {0}")]
    Resample(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Shorthand for a decode failure on `path`
    pub fn decode(path: impl AsRef<std::path::Path>, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Shorthand for an unusable probe result on `path`
    pub fn invalid_probe(path: impl AsRef<std::path::Path>, reason: impl ToString) -> Self {
        Self::InvalidProbe {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for media operations
pub type MediaResult<T> = Result<T, MediaError>;
