//! sf-media: decode and probe backends
//!
//! Two implementations of [`sf_core::MediaBackend`]:
//!
//! - [`FfmpegBackend`] shells out to `ffmpeg`/`ffprobe` and handles anything
//!   they can read, including video containers.
//! - [`NativeBackend`] decodes audio containers in-process with symphonia
//!   and resamples with rubato. No external tools required.

mod ffmpeg;
mod native;
mod resample;
mod wav;

pub use ffmpeg::*;
pub use native::*;
pub use resample::*;
pub use wav::*;

use sf_core::MediaBackend;
use serde::{Deserialize, Serialize};

/// Available decode backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoderKind {
    /// External ffmpeg/ffprobe processes
    #[default]
    Ffmpeg,
    /// In-process symphonia + rubato
    Native,
}

impl DecoderKind {
    /// Instantiate the backend
    pub fn backend(self) -> Box<dyn MediaBackend> {
        match self {
            Self::Ffmpeg => Box::new(FfmpegBackend::from_env()),
            Self::Native => Box::new(NativeBackend::new()),
        }
    }
}

impl std::str::FromStr for DecoderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ffmpeg" => Ok(Self::Ffmpeg),
            "native" | "symphonia" => Ok(Self::Native),
            other => Err(format!("unknown decoder '{other}' (expected ffmpeg or native)")),
        }
    }
}
