//! Configuration for landmark extraction

use crate::{FingerprintError, FingerprintResult};
use serde::{Deserialize, Serialize};

/// Spectrogram and peak-picking parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintConfig {
    /// FFT window length in samples
    pub fft_bin_size: usize,

    /// Samples shared by consecutive windows
    pub overlap: usize,

    /// Peak-picking cell height in frequency bins
    pub box_height: usize,

    /// Peak-picking cell width in windows
    pub box_width: usize,

    /// Peaks kept per cell
    pub max_peaks_per_box: usize,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            fft_bin_size: 1024,
            overlap: 0,
            box_height: 512,
            box_width: 43,
            max_peaks_per_box: 7,
        }
    }
}

impl FingerprintConfig {
    /// Denser landmarks for short or quiet recordings
    pub fn dense() -> Self {
        Self {
            box_height: 128,
            box_width: 21,
            max_peaks_per_box: 10,
            ..Default::default()
        }
    }

    /// Sparse landmarks for very long recordings
    pub fn sparse() -> Self {
        Self {
            box_width: 86,
            max_peaks_per_box: 5,
            ..Default::default()
        }
    }

    /// Builder pattern: set FFT size
    pub fn with_fft_bin_size(mut self, size: usize) -> Self {
        self.fft_bin_size = size;
        self
    }

    /// Builder pattern: set window overlap
    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    /// Builder pattern: set peak-picking cell size
    pub fn with_box(mut self, height: usize, width: usize) -> Self {
        self.box_height = height;
        self.box_width = width;
        self
    }

    /// Builder pattern: set peaks kept per cell
    pub fn with_max_peaks_per_box(mut self, peaks: usize) -> Self {
        self.max_peaks_per_box = peaks;
        self
    }

    /// Check parameter constraints
    pub fn validate(&self) -> FingerprintResult<()> {
        if self.fft_bin_size < 2 {
            return Err(FingerprintError::InvalidConfig(format!(
                "fft_bin_size must be at least 2, got {}",
                self.fft_bin_size
            )));
        }
        if self.overlap >= self.fft_bin_size {
            return Err(FingerprintError::InvalidConfig(format!(
                "overlap ({}) must be smaller than fft_bin_size ({})",
                self.overlap, self.fft_bin_size
            )));
        }
        if self.box_height == 0 || self.box_width == 0 {
            return Err(FingerprintError::InvalidConfig(format!(
                "box size must be positive, got {}x{}",
                self.box_width, self.box_height
            )));
        }
        if self.max_peaks_per_box == 0 {
            return Err(FingerprintError::InvalidConfig(
                "max_peaks_per_box must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Step between consecutive window starts
    #[inline]
    pub fn hop_size(&self) -> usize {
        self.fft_bin_size - self.overlap
    }

    /// Number of frequency bins kept per window
    #[inline]
    pub fn num_bins(&self) -> usize {
        self.fft_bin_size / 2
    }

    /// Time resolution of one window index in seconds
    pub fn window_duration(&self, sample_rate: u32) -> f64 {
        self.fft_bin_size as f64 / sample_rate as f64
    }
}
