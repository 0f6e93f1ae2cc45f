//! sf-core: Shared types and the media capability interface for SyncForge
//!
//! Everything the alignment engine needs from the outside world goes
//! through [`MediaBackend`]: partial decode of a file into a mono
//! [`Waveform`] and a metadata probe returning [`MediaInfo`].

mod error;
mod media;
mod waveform;

pub use error::*;
pub use media::*;
pub use waveform::*;

/// Sample rate of the coarse alignment pass (44.1 kHz / 12)
pub const COARSE_SAMPLE_RATE: u32 = 44100 / 12;

/// Default sample rate of the fine alignment pass
pub const DEFAULT_SAMPLE_RATE: u32 = 48000;
