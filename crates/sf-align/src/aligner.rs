//! Two-pass alignment driver
//!
//! The coarse pass compares long, low-rate excerpts to find roughly where
//! each file sits relative to the first one. Its result is turned into
//! per-file start hints so the fine pass only has to read a short excerpt
//! at the full rate around the expected match.

use crate::cache::MediaInfoCache;
use crate::config::AlignConfig;
use crate::hints::KnownDelayHints;
use crate::normalize::{normalize, recenter, AlignmentRecord};
use crate::report::EditList;
use crate::{AlignError, AlignResult};
use sf_core::{DecodeRequest, MediaBackend, MediaInfo, Waveform};
use sf_fingerprint::{find_delay, FingerprintError, FrequencyTransitionSummary, SummaryBuilder};
use std::fmt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Alignment pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Low sample rate, wide search range
    Coarse,
    /// Target sample rate, narrow search range around the coarse result
    Fine,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coarse => write!(f, "coarse"),
            Self::Fine => write!(f, "fine"),
        }
    }
}

/// Aligns a batch of recordings of the same event
pub struct Aligner<B: MediaBackend> {
    backend: B,
    config: AlignConfig,
    media_info: MediaInfoCache,
}

impl<B: MediaBackend> Aligner<B> {
    /// Create an aligner, rejecting invalid configurations up front
    pub fn new(backend: B, config: AlignConfig) -> AlignResult<Self> {
        config.validate()?;
        Ok(Self {
            backend,
            config,
            media_info: MediaInfoCache::new(),
        })
    }

    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Probed metadata of `path`, memoized for the lifetime of the aligner
    pub fn media_info(&self, path: &Path) -> AlignResult<MediaInfo> {
        Ok(self.media_info.get_or_probe(path, &self.backend)?)
    }

    /// Compute the edit list that brings `files` into sync.
    ///
    /// The first file is the reference. `hints` maps file indices to
    /// seconds the file is known to start late by, at least.
    pub fn align<P: AsRef<Path>>(
        &self,
        files: &[P],
        hints: &KnownDelayHints,
    ) -> AlignResult<EditList> {
        let files: Vec<PathBuf> = files.iter().map(|p| p.as_ref().to_path_buf()).collect();
        if files.len() < 2 {
            return Err(AlignError::NotEnoughInputs(files.len()));
        }
        hints.validate(files.len())?;

        let scratch = self.scratch_dir()?;
        log::debug!("scratch directory {}", scratch.path().display());

        let coarse = self.run_pass(Pass::Coarse, &files, hints, scratch.path())?;

        let refined = KnownDelayHints::refined(
            coarse.iter().map(|record| record.trim_pre),
            self.config.refine_margin,
        );
        let fine = self.run_pass(Pass::Fine, &files, &refined, scratch.path())?;

        Ok(EditList::new(
            files.iter().map(|path| path.display().to_string()),
            fine,
        ))
    }

    fn scratch_dir(&self) -> AlignResult<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("syncforge-");
        let dir = match &self.config.scratch_dir {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        Ok(dir)
    }

    /// Estimate every file's offset against file 0 and normalize
    fn run_pass(
        &self,
        pass: Pass,
        files: &[PathBuf],
        hints: &KnownDelayHints,
        scratch: &Path,
    ) -> AlignResult<Vec<AlignmentRecord>> {
        let (sample_rate, max_misalignment) = match pass {
            Pass::Coarse => (self.config.coarse_sample_rate, self.config.max_misalignment),
            Pass::Fine => (self.config.sample_rate, self.config.refine_max_misalignment),
        };
        log::info!(
            "{} pass: {} files @ {} Hz, searching ±{:.1}s ({})",
            pass,
            files.len(),
            sample_rate,
            max_misalignment,
            self.backend.name()
        );

        let builder = SummaryBuilder::new(&self.config.fingerprint)?;
        let fft_bin_size = self.config.fingerprint.fft_bin_size;

        let summarize = |index: usize| -> AlignResult<(Waveform, FrequencyTransitionSummary)> {
            let request = DecodeRequest::new(&files[index], sample_rate)
                .starting_at(hints.get(index))
                .limited_to(2.0 * max_misalignment);
            let waveform = self.backend.decode(&request, scratch)?;
            if waveform.sample_rate != sample_rate {
                log::warn!(
                    "{} decoded at {} Hz instead of {} Hz",
                    files[index].display(),
                    waveform.sample_rate,
                    sample_rate
                );
            }
            let summary = builder.build(&waveform.samples)?;
            Ok((waveform, summary))
        };

        let (reference_wave, reference) = summarize(0)?;
        log::debug!(
            "reference {}: {:.1}s, {} landmarks",
            files[0].display(),
            reference_wave.duration(),
            reference.num_landmarks()
        );

        let mut offsets = vec![0.0; files.len()];
        for index in 1..files.len() {
            let (waveform, summary) = summarize(index)?;
            let estimate = find_delay(&reference, &summary).map_err(|e| match e {
                FingerprintError::NoMatch => AlignError::NoMatch {
                    reference: files[0].display().to_string(),
                    file: files[index].display().to_string(),
                },
                other => other.into(),
            })?;

            let delay = estimate.seconds(fft_bin_size, waveform.sample_rate);
            log::debug!(
                "{}: delay {:+.4}s ({} windows, {} votes vs {})",
                files[index].display(),
                delay,
                estimate.delay_windows,
                estimate.votes,
                estimate.runner_up_votes
            );
            offsets[index] = -delay;
        }

        recenter(&mut offsets, hints);

        let durations = files
            .iter()
            .map(|path| self.media_info(path).map(|info| info.duration))
            .collect::<AlignResult<Vec<f64>>>()?;

        Ok(normalize(&offsets, &durations))
    }
}
