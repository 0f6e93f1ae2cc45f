//! Configuration for alignment runs

use crate::{AlignError, AlignResult};
use serde::{Deserialize, Serialize};
use sf_core::{COARSE_SAMPLE_RATE, DEFAULT_SAMPLE_RATE};
use sf_fingerprint::FingerprintConfig;
use std::path::PathBuf;

/// Alignment parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignConfig {
    /// Landmark extraction parameters (shared by both passes)
    pub fingerprint: FingerprintConfig,

    /// Initial search half-width in seconds; the coarse pass reads twice this
    pub max_misalignment: f64,

    /// Sample rate of the fine pass
    pub sample_rate: u32,

    /// Sample rate of the coarse pass
    pub coarse_sample_rate: u32,

    /// Safety margin subtracted from coarse trims when deriving fine-pass hints
    pub refine_margin: f64,

    /// Search half-width of the fine pass in seconds
    pub refine_max_misalignment: f64,

    /// Parent directory for the run's scratch directory (system temp if unset)
    pub scratch_dir: Option<PathBuf>,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            fingerprint: FingerprintConfig::default(),
            max_misalignment: 120.0,
            sample_rate: DEFAULT_SAMPLE_RATE,
            coarse_sample_rate: COARSE_SAMPLE_RATE,
            refine_margin: 5.0,
            refine_max_misalignment: 15.0,
            scratch_dir: None,
        }
    }
}

impl AlignConfig {
    /// Lower fine-pass rate: a few tens of ms less precise, much less memory
    pub fn fast() -> Self {
        Self {
            sample_rate: 22050,
            ..Default::default()
        }
    }

    /// Denser landmarks for quiet or noisy material
    pub fn quality() -> Self {
        Self {
            fingerprint: FingerprintConfig::dense(),
            ..Default::default()
        }
    }

    /// Builder pattern: set the initial search half-width
    pub fn with_max_misalignment(mut self, seconds: f64) -> Self {
        self.max_misalignment = seconds;
        self
    }

    /// Builder pattern: set the fine-pass sample rate
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Builder pattern: set fingerprint parameters
    pub fn with_fingerprint(mut self, fingerprint: FingerprintConfig) -> Self {
        self.fingerprint = fingerprint;
        self
    }

    /// Builder pattern: put scratch files under `dir`
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Check parameter constraints
    pub fn validate(&self) -> AlignResult<()> {
        self.fingerprint.validate()?;

        for (name, seconds) in [
            ("max_misalignment", self.max_misalignment),
            ("refine_max_misalignment", self.refine_max_misalignment),
        ] {
            if !(seconds.is_finite() && seconds > 0.0) {
                return Err(AlignError::ConfigError(format!(
                    "{name} must be a positive number of seconds, got {seconds}"
                )));
            }
        }
        if !(self.refine_margin.is_finite() && self.refine_margin >= 0.0) {
            return Err(AlignError::ConfigError(format!(
                "refine_margin must be non-negative, got {}",
                self.refine_margin
            )));
        }
        if self.sample_rate == 0 || self.coarse_sample_rate == 0 {
            return Err(AlignError::ConfigError("sample rates must be positive".into()));
        }
        Ok(())
    }
}
