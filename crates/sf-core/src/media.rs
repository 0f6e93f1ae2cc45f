//! Media capability interface
//!
//! The alignment engine never talks to a concrete decoder. Any type
//! implementing [`MediaBackend`] can be plugged in: an ffmpeg wrapper, a
//! pure-Rust decoder, or a scripted source in tests.

use crate::error::MediaResult;
use crate::waveform::Waveform;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Probed metadata of a media file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Playback duration in seconds
    pub duration: f64,

    /// Native sample rate of the first audio stream
    pub sample_rate: Option<u32>,

    /// Channel count of the first audio stream
    pub channels: Option<u16>,

    /// Whether the container carries a video stream
    pub has_video: bool,

    /// Container format name as reported by the prober
    pub format_name: Option<String>,
}

impl MediaInfo {
    /// Metadata carrying only a duration
    pub fn with_duration(duration: f64) -> Self {
        Self {
            duration,
            ..Default::default()
        }
    }
}

/// A partial, resampled, mono decode of one file
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeRequest {
    /// Source media file
    pub path: PathBuf,

    /// Seconds to skip from the beginning of the file
    pub start_offset: f64,

    /// Hard cap on the decoded length in seconds
    pub max_duration: f64,

    /// Output sample rate in Hz
    pub sample_rate: u32,
}

impl DecodeRequest {
    pub fn new(path: impl Into<PathBuf>, sample_rate: u32) -> Self {
        Self {
            path: path.into(),
            start_offset: 0.0,
            max_duration: f64::INFINITY,
            sample_rate,
        }
    }

    /// Builder pattern: start decoding `seconds` into the file
    pub fn starting_at(mut self, seconds: f64) -> Self {
        self.start_offset = seconds.max(0.0);
        self
    }

    /// Builder pattern: stop after `seconds` of audio
    pub fn limited_to(mut self, seconds: f64) -> Self {
        self.max_duration = seconds.max(0.0);
        self
    }

    /// Maximum number of output samples, if the duration is bounded
    pub fn max_samples(&self) -> Option<usize> {
        self.max_duration
            .is_finite()
            .then(|| (self.max_duration * self.sample_rate as f64).round() as usize)
    }
}

/// Decode + probe capability required by the aligner
pub trait MediaBackend {
    /// Decode `request.path` into a mono waveform at `request.sample_rate`.
    ///
    /// `scratch_dir` is a run-scoped directory the backend may use for
    /// intermediate files. It is deleted by the caller when the run ends.
    fn decode(&self, request: &DecodeRequest, scratch_dir: &Path) -> MediaResult<Waveform>;

    /// Probe `path` for its duration and stream layout
    fn probe(&self, path: &Path) -> MediaResult<MediaInfo>;

    /// Short backend name for logging
    fn name(&self) -> &'static str {
        "media"
    }
}

impl<B: MediaBackend + ?Sized> MediaBackend for &B {
    fn decode(&self, request: &DecodeRequest, scratch_dir: &Path) -> MediaResult<Waveform> {
        (**self).decode(request, scratch_dir)
    }

    fn probe(&self, path: &Path) -> MediaResult<MediaInfo> {
        (**self).probe(path)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<B: MediaBackend + ?Sized> MediaBackend for Box<B> {
    fn decode(&self, request: &DecodeRequest, scratch_dir: &Path) -> MediaResult<Waveform> {
        (**self).decode(request, scratch_dir)
    }

    fn probe(&self, path: &Path) -> MediaResult<MediaInfo> {
        (**self).probe(path)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
