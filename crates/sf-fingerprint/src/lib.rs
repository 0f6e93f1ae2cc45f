//! # sf-fingerprint
//!
//! Landmark-based audio fingerprinting for offset estimation.
//!
//! ## Pipeline
//!
//! ```text
//! waveform ─► windowed |DFT| ─► per-box top-N peaks ─► bin → [window, ...]
//!                                                          │
//!          reference summary ─────────────────────────────►├─► delay histogram ─► best delay
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use sf_fingerprint::{estimate_delay, FingerprintConfig, SummaryBuilder};
//!
//! let config = FingerprintConfig::default();
//! let builder = SummaryBuilder::new(&config)?;
//! let reference = builder.build(&ref_wave.samples)?;
//! let sample = builder.build(&other_wave.samples)?;
//!
//! let seconds = estimate_delay(&reference, &sample, config.fft_bin_size, 48000)?;
//! ```

pub mod config;
pub mod delay;
pub mod summary;

pub use config::FingerprintConfig;
pub use delay::{estimate_delay, find_delay, DelayEstimate, DelayHistogram};
pub use summary::{build_summary, FrequencyTransitionSummary, SummaryBuilder};

use thiserror::Error;

/// Errors that can occur while fingerprinting or matching
#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error(
        "No matching landmarks between the recordings. Consider a larger \
         max_misalignment if the media are sure to capture the same event"
    )]
    NoMatch,

    #[error("Invalid fingerprint configuration: {0}")]
    InvalidConfig(String),

    #[error("FFT error: {0}")]
    Fft(String),
}

pub type FingerprintResult<T> = std::result::Result<T, FingerprintError>;
