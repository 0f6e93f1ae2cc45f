//! Decoded mono audio

/// Mono sample buffer produced by a [`crate::MediaBackend`] for one file
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    /// Samples, nominally in -1.0..=1.0
    pub samples: Vec<f64>,

    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Empty waveform at the given rate
    pub fn silent(sample_rate: u32) -> Self {
        Self::new(Vec::new(), sample_rate)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Peak absolute amplitude
    pub fn peak(&self) -> f64 {
        self.samples.iter().map(|s| s.abs()).fold(0.0, f64::max)
    }
}
