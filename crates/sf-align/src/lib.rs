//! # sf-align
//!
//! Multi-file alignment: estimates every file's offset against the first
//! one and turns the offsets into a per-file edit list.
//!
//! ## Two passes
//!
//! ```text
//!  coarse: 3675 Hz, start = hint, length = 2 × max_misalignment
//!     │
//!     ▼  hint[i] = max(0, trim_pre[i] − 5 s), max_misalignment = 15 s
//!  fine:   target rate, start = hint, length = 30 s
//!     │
//!     ▼
//!  pad/trim normalization ─► EditList
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use sf_align::{AlignConfig, Aligner, KnownDelayHints};
//! use sf_media::FfmpegBackend;
//!
//! let aligner = Aligner::new(FfmpegBackend::new(), AlignConfig::default())?;
//! let edit_list = aligner.align(&["cam1.mp4", "cam2.mp4"], &KnownDelayHints::new())?;
//! println!("{}", edit_list.to_json_pretty()?);
//! ```

pub mod aligner;
pub mod cache;
pub mod config;
pub mod hints;
pub mod normalize;
pub mod report;

pub use aligner::{Aligner, Pass};
pub use cache::MediaInfoCache;
pub use config::AlignConfig;
pub use hints::KnownDelayHints;
pub use normalize::{normalize, recenter, AlignmentRecord};
pub use report::EditList;

use sf_core::MediaError;
use sf_fingerprint::FingerprintError;
use thiserror::Error;

/// Errors that abort an alignment run
#[derive(Error, Debug)]
pub enum AlignError {
    #[error("At least two media files are required, got {0}")]
    NotEnoughInputs(usize),

    #[error("Invalid known delay map: {0}")]
    InvalidHint(String),

    #[error(
        "Could not find a match between '{reference}' and '{file}'. Consider giving a \
         larger value to max_misalignment if the media are sure to capture the same event"
    )]
    NoMatch { reference: String, file: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Fingerprint(FingerprintError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<FingerprintError> for AlignError {
    fn from(e: FingerprintError) -> Self {
        match e {
            FingerprintError::InvalidConfig(msg) => Self::ConfigError(msg),
            other => Self::Fingerprint(other),
        }
    }
}

pub type AlignResult<T> = std::result::Result<T, AlignError>;
