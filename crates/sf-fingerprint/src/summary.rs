//! Sparse spectral landmark extraction
//!
//! The magnitude spectrogram of a recording is reduced to a handful of
//! dominant points per rectangular (time × frequency) cell. Two independent
//! recordings of the same event differ in level, noise and microphone
//! coloring, but the strongest points inside a cell tend to survive all of
//! that, so they make good matching landmarks.

use crate::config::FingerprintConfig;
use crate::{FingerprintError, FingerprintResult};
use rayon::prelude::*;
use realfft::{RealFftPlanner, RealToComplex};
use sf_core::Waveform;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;

/// Frequency bin → ascending window indices where that bin was a retained peak
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTransitionSummary {
    peaks: BTreeMap<usize, Vec<usize>>,
}

impl FrequencyTransitionSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `bin` was a peak in window `window`
    pub fn insert(&mut self, bin: usize, window: usize) {
        self.peaks.entry(bin).or_default().push(window);
    }

    /// Window indices for `bin` (empty if the bin never peaked)
    pub fn windows(&self, bin: usize) -> &[usize] {
        self.peaks.get(&bin).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_bin(&self, bin: usize) -> bool {
        self.peaks.contains_key(&bin)
    }

    /// Bins that peaked at least once, ascending
    pub fn bins(&self) -> impl Iterator<Item = usize> + '_ {
        self.peaks.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> + '_ {
        self.peaks.iter().map(|(&bin, windows)| (bin, windows.as_slice()))
    }

    /// Bins present in both summaries, ascending
    pub fn shared_bins<'a>(&'a self, other: &'a Self) -> impl Iterator<Item = usize> + 'a {
        self.bins().filter(move |bin| other.contains_bin(*bin))
    }

    /// Number of distinct bins
    pub fn num_bins(&self) -> usize {
        self.peaks.len()
    }

    /// Total number of retained points
    pub fn num_landmarks(&self) -> usize {
        self.peaks.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    fn finish(mut self) -> Self {
        for windows in self.peaks.values_mut() {
            windows.sort_unstable();
            windows.dedup();
        }
        self
    }
}

impl FromIterator<(usize, usize)> for FrequencyTransitionSummary {
    /// Collect `(bin, window)` pairs
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        let mut summary = Self::new();
        for (bin, window) in iter {
            summary.insert(bin, window);
        }
        summary.finish()
    }
}

/// One spectrogram point
#[derive(Debug, Clone, Copy)]
struct Peak {
    intensity: f64,
    window: usize,
    bin: usize,
}

/// Strongest first; equal intensities fall back to earliest window, lowest bin
fn rank(a: &Peak, b: &Peak) -> Ordering {
    b.intensity
        .total_cmp(&a.intensity)
        .then(a.window.cmp(&b.window))
        .then(a.bin.cmp(&b.bin))
}

/// Move the `count` strongest points of a cell to its front and return them
fn strongest(cell: &mut [Peak], count: usize) -> &[Peak] {
    if cell.len() > count {
        cell.select_nth_unstable_by(count - 1, rank);
        &cell[..count]
    } else {
        cell
    }
}

/// Builds [`FrequencyTransitionSummary`] values for one parameter set
pub struct SummaryBuilder {
    config: FingerprintConfig,
    fft: Arc<dyn RealToComplex<f64>>,
}

impl SummaryBuilder {
    /// Validate `config` and plan the forward FFT
    pub fn new(config: &FingerprintConfig) -> FingerprintResult<Self> {
        config.validate()?;

        let mut planner = RealFftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(config.fft_bin_size);

        Ok(Self {
            config: *config,
            fft,
        })
    }

    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    /// Number of window positions, counting the leading one at `-overlap`
    fn window_count(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (len + self.config.overlap).div_ceil(self.config.hop_size())
    }

    /// First sample of window `index`, if the whole window lies inside the signal
    fn window_start(&self, index: usize, len: usize) -> Option<usize> {
        let start = (index * self.config.hop_size()).checked_sub(self.config.overlap)?;
        (start + self.config.fft_bin_size <= len).then_some(start)
    }

    /// Lower-half magnitude spectra for every full window in `windows`
    fn magnitudes(
        &self,
        samples: &[f64],
        windows: Range<usize>,
    ) -> FingerprintResult<Vec<(usize, Vec<f64>)>> {
        let fft = &self.fft;
        let size = self.config.fft_bin_size;
        let half = self.config.num_bins();

        windows
            .into_par_iter()
            .filter_map(|index| {
                self.window_start(index, samples.len())
                    .map(|start| (index, start))
            })
            .map_init(
                || (fft.make_input_vec(), fft.make_output_vec()),
                |(input, spectrum), (index, start)| -> FingerprintResult<(usize, Vec<f64>)> {
                    input.copy_from_slice(&samples[start..start + size]);
                    fft.process(input, spectrum)
                        .map_err(|e| FingerprintError::Fft(e.to_string()))?;
                    Ok((index, spectrum[..half].iter().map(|c| c.norm()).collect()))
                },
            )
            .collect()
    }

    /// Extract landmarks from `samples`.
    ///
    /// Windows are processed one column of cells at a time, so memory stays
    /// bounded by `box_width` spectra regardless of the signal length.
    pub fn build(&self, samples: &[f64]) -> FingerprintResult<FrequencyTransitionSummary> {
        let FingerprintConfig {
            box_height,
            box_width,
            max_peaks_per_box,
            ..
        } = self.config;
        let half = self.config.num_bins();
        let total = self.window_count(samples.len());

        let mut summary = FrequencyTransitionSummary::new();
        let mut cell: Vec<Peak> = Vec::with_capacity(box_width * box_height.min(half));

        for column_start in (0..total).step_by(box_width) {
            let column_end = (column_start + box_width).min(total);
            let spectra = self.magnitudes(samples, column_start..column_end)?;
            if spectra.is_empty() {
                continue;
            }

            for row_start in (0..half).step_by(box_height) {
                let row_end = (row_start + box_height).min(half);

                cell.clear();
                for (window, magnitudes) in &spectra {
                    cell.extend((row_start..row_end).map(|bin| Peak {
                        intensity: magnitudes[bin],
                        window: *window,
                        bin,
                    }));
                }

                for peak in strongest(&mut cell, max_peaks_per_box) {
                    summary.insert(peak.bin, peak.window);
                }
            }
        }

        let summary = summary.finish();
        log::trace!(
            "summary: {} samples, {} windows -> {} landmarks in {} bins",
            samples.len(),
            total,
            summary.num_landmarks(),
            summary.num_bins()
        );
        Ok(summary)
    }
}

/// One-shot summary of a waveform
pub fn build_summary(
    waveform: &Waveform,
    config: &FingerprintConfig,
) -> FingerprintResult<FrequencyTransitionSummary> {
    SummaryBuilder::new(config)?.build(&waveform.samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;
    use rustfft::FftPlanner;
    use rustfft::num_complex::Complex;
    use std::f64::consts::PI;

    fn noise(len: usize, seed: u64) -> Vec<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..len).map(|_| rng.random::<f64>() * 2.0 - 1.0).collect()
    }

    fn sine(len: usize, freq: f64, sample_rate: f64) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_keys_within_lower_half() {
        let samples = noise(50_000, 7);
        let configs = [
            FingerprintConfig::default(),
            FingerprintConfig::dense(),
            FingerprintConfig::default().with_fft_bin_size(333).with_overlap(100),
            FingerprintConfig::default().with_fft_bin_size(64).with_box(5, 3),
        ];

        for config in configs {
            let summary = SummaryBuilder::new(&config).unwrap().build(&samples).unwrap();
            assert!(!summary.is_empty());
            assert!(summary.bins().all(|bin| bin < config.fft_bin_size / 2));
        }
    }

    #[test]
    fn test_short_signal_yields_empty_summary() {
        let builder = SummaryBuilder::new(&FingerprintConfig::default()).unwrap();
        assert!(builder.build(&noise(1023, 1)).unwrap().is_empty());
        assert!(builder.build(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_pure_tone_peaks_in_its_bin() {
        // 800 Hz at 8192 Hz is exactly bin 100 of a 1024-point FFT
        let samples = sine(8192 * 2, 800.0, 8192.0);
        let summary = build_summary(
            &Waveform::new(samples, 8192),
            &FingerprintConfig::default(),
        )
        .unwrap();

        // 16 windows in a single cell, every retained point is the tone
        assert_eq!(summary.bins().collect::<Vec<_>>(), vec![100]);
        assert_eq!(summary.windows(100).len(), 7);
        assert!(summary.windows(100).iter().all(|&w| w < 16));
    }

    #[test]
    fn test_leading_partial_window_is_dropped() {
        // Windows start at -256, 512, 1280; only the one at 512 fits
        let config = FingerprintConfig::default().with_overlap(256);
        let samples = sine(2048, 800.0, 8192.0);
        let summary = SummaryBuilder::new(&config).unwrap().build(&samples).unwrap();

        assert!(!summary.is_empty());
        assert!(summary.iter().all(|(_, windows)| windows == [1]));
    }

    #[test]
    fn test_peaks_capped_per_cell() {
        let config = FingerprintConfig::default().with_box(64, 10).with_max_peaks_per_box(3);
        let samples = noise(1024 * 95, 3);
        let summary = SummaryBuilder::new(&config).unwrap().build(&samples).unwrap();

        // 95 windows -> 10 columns, 512 bins -> 8 rows
        assert_eq!(summary.num_landmarks(), 10 * 8 * 3);
    }

    #[test]
    fn test_deterministic_across_runs() {
        let samples = noise(200_000, 11);
        let builder = SummaryBuilder::new(&FingerprintConfig::dense()).unwrap();
        assert_eq!(builder.build(&samples).unwrap(), builder.build(&samples).unwrap());
    }

    #[test]
    fn test_magnitudes_match_complex_fft() {
        let config = FingerprintConfig::default().with_fft_bin_size(256);
        let builder = SummaryBuilder::new(&config).unwrap();
        let samples = noise(1024, 5);

        let spectra = builder.magnitudes(&samples, 0..4).unwrap();
        assert_eq!(spectra.len(), 4);

        let fft = FftPlanner::<f64>::new().plan_fft_forward(256);
        for (window, magnitudes) in spectra {
            let start = window * 256;
            let mut buffer: Vec<Complex<f64>> = samples[start..start + 256]
                .iter()
                .map(|&s| Complex::new(s, 0.0))
                .collect();
            fft.process(&mut buffer);

            assert_eq!(magnitudes.len(), 128);
            for (bin, magnitude) in magnitudes.iter().enumerate() {
                approx::assert_relative_eq!(*magnitude, buffer[bin].norm(), epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_from_iterator_sorts_windows() {
        let summary: FrequencyTransitionSummary =
            [(3, 9), (3, 1), (1, 4), (3, 1)].into_iter().collect();

        assert_eq!(summary.windows(3), &[1, 9]);
        assert_eq!(summary.windows(1), &[4]);
        assert!(summary.windows(2).is_empty());
        assert_eq!(summary.num_landmarks(), 3);
    }
}
