//! ffmpeg / ffprobe backed decoding
//!
//! Decoding writes a temporary mono 16-bit WAV into the caller's scratch
//! directory, reads it back with hound and removes it again. Probing parses
//! `ffprobe -print_format json` output.

use crate::wav::read_wav_mono;
use serde::Deserialize;
use sf_core::{DecodeRequest, MediaBackend, MediaError, MediaInfo, MediaResult, Waveform};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Environment variable overriding the ffmpeg executable
pub const FFMPEG_ENV: &str = "SYNCFORGE_FFMPEG";

/// Environment variable overriding the ffprobe executable
pub const FFPROBE_ENV: &str = "SYNCFORGE_FFPROBE";

/// Backend driving external `ffmpeg` and `ffprobe` processes
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    ffmpeg: OsString,
    ffprobe: OsString,
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::with_binaries("ffmpeg", "ffprobe")
    }
}

impl FfmpegBackend {
    /// Use `ffmpeg` and `ffprobe` from `PATH`
    pub fn new() -> Self {
        Self::default()
    }

    /// Use explicit executables
    pub fn with_binaries(ffmpeg: impl Into<OsString>, ffprobe: impl Into<OsString>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// `PATH` lookup unless overridden by `SYNCFORGE_FFMPEG` / `SYNCFORGE_FFPROBE`
    pub fn from_env() -> Self {
        let ffmpeg = std::env::var_os(FFMPEG_ENV).unwrap_or_else(|| "ffmpeg".into());
        let ffprobe = std::env::var_os(FFPROBE_ENV).unwrap_or_else(|| "ffprobe".into());
        Self::with_binaries(ffmpeg, ffprobe)
    }

    /// Arguments for a mono PCM extraction of `request` into `output`
    fn decode_args(request: &DecodeRequest, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-y"]
            .into_iter()
            .map(OsString::from)
            .collect();

        if request.start_offset > 0.0 {
            args.push("-ss".into());
            args.push(format!("{:.6}", request.start_offset).into());
        }
        args.push("-i".into());
        args.push(request.path.clone().into_os_string());
        if request.max_duration.is_finite() {
            args.push("-t".into());
            args.push(format!("{:.6}", request.max_duration).into());
        }

        for arg in ["-vn", "-ac", "1", "-ar"] {
            args.push(arg.into());
        }
        args.push(request.sample_rate.to_string().into());
        for arg in ["-acodec", "pcm_s16le", "-f", "wav"] {
            args.push(arg.into());
        }
        args.push(output.as_os_str().to_owned());
        args
    }
}

/// Run a tool to completion, mapping spawn and exit failures
fn run_tool(program: &OsString, args: &[OsString]) -> MediaResult<Output> {
    let command = program.to_string_lossy().into_owned();
    log::trace!("running {} {:?}", command, args);

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => MediaError::CommandMissing {
                command: command.clone(),
            },
            _ => MediaError::Io(e),
        })?;

    if !output.status.success() {
        return Err(MediaError::CommandFailed {
            command,
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}

impl MediaBackend for FfmpegBackend {
    fn decode(&self, request: &DecodeRequest, scratch_dir: &Path) -> MediaResult<Waveform> {
        if !request.path.is_file() {
            return Err(MediaError::NotFound(request.path.clone()));
        }

        // Removed when dropped, whatever happens below
        let wav_path = tempfile::Builder::new()
            .prefix("decode-")
            .suffix(".wav")
            .tempfile_in(scratch_dir)?
            .into_temp_path();

        run_tool(&self.ffmpeg, &Self::decode_args(request, &wav_path))?;

        let mut waveform = read_wav_mono(&wav_path)?;
        if waveform.sample_rate != request.sample_rate {
            return Err(MediaError::decode(
                &request.path,
                format!(
                    "ffmpeg produced {} Hz instead of {} Hz",
                    waveform.sample_rate, request.sample_rate
                ),
            ));
        }
        if let Some(limit) = request.max_samples() {
            waveform.samples.truncate(limit);
        }

        log::debug!(
            "ffmpeg decoded {} ({:.1}s from {:.1}s @ {} Hz)",
            request.path.display(),
            waveform.duration(),
            request.start_offset,
            request.sample_rate
        );
        Ok(waveform)
    }

    fn probe(&self, path: &Path) -> MediaResult<MediaInfo> {
        if !path.is_file() {
            return Err(MediaError::NotFound(path.to_path_buf()));
        }

        let args: Vec<OsString> = vec![
            "-v".into(),
            "error".into(),
            "-print_format".into(),
            "json".into(),
            "-show_format".into(),
            "-show_streams".into(),
            path.as_os_str().to_owned(),
        ];
        let output = run_tool(&self.ffprobe, &args)?;
        parse_probe_output(path, &String::from_utf8_lossy(&output.stdout))
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u16>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
    format_name: Option<String>,
}

fn parse_seconds(value: Option<&String>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
}

/// Turn ffprobe JSON into [`MediaInfo`].
///
/// The container duration wins; otherwise the longest stream duration is used.
pub fn parse_probe_output(path: &Path, json: &str) -> MediaResult<MediaInfo> {
    let probe: ProbeOutput =
        serde_json::from_str(json).map_err(|e| MediaError::invalid_probe(path, e))?;

    let audio = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"));
    if audio.is_none() {
        log::warn!("{} has no audio stream", path.display());
    }

    let duration = probe
        .format
        .as_ref()
        .and_then(|f| parse_seconds(f.duration.as_ref()))
        .or_else(|| {
            probe
                .streams
                .iter()
                .filter_map(|s| parse_seconds(s.duration.as_ref()))
                .reduce(f64::max)
        })
        .ok_or_else(|| MediaError::invalid_probe(path, "no duration reported"))?;

    Ok(MediaInfo {
        duration,
        sample_rate: audio
            .and_then(|s| s.sample_rate.as_deref())
            .and_then(|r| r.parse().ok()),
        channels: audio.and_then(|s| s.channels),
        has_video: probe
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some("video")),
        format_name: probe.format.and_then(|f| f.format_name),
    })
}
