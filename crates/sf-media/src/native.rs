//! In-process decoding with symphonia
//!
//! Only audio containers are supported (WAV, FLAC, MP3, OGG, M4A, ...).
//! The requested start offset is honored by decoding and discarding
//! frames, so this backend gets slower the further into a file it starts.

use crate::resample::resample_mono;
use crate::wav::downmix;
use sf_core::{DecodeRequest, MediaBackend, MediaError, MediaInfo, MediaResult, Waveform};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, CodecParameters, Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Pure-Rust decode backend
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeBackend;

/// An opened container positioned at its first audio packet
struct OpenedTrack {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    params: CodecParameters,
    track_id: u32,
}

impl NativeBackend {
    pub fn new() -> Self {
        Self
    }

    fn open(path: &Path) -> MediaResult<OpenedTrack> {
        if !path.is_file() {
            return Err(MediaError::NotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| MediaError::Unsupported(format!("{}: {}", path.display(), e)))?;

        let format = probed.format;
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| MediaError::decode(path, "no audio track"))?;

        let params = track.codec_params.clone();
        let track_id = track.id;

        let decoder = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .map_err(|e| MediaError::Unsupported(format!("{}: {}", path.display(), e)))?;

        Ok(OpenedTrack {
            format,
            decoder,
            params,
            track_id,
        })
    }

    /// Decode mono frames `[skip, skip + limit)` at the native rate
    fn decode_native(
        path: &Path,
        opened: &mut OpenedTrack,
        skip: usize,
        limit: Option<usize>,
    ) -> MediaResult<Vec<f64>> {
        let mut skipped = 0usize;
        let mut mono: Vec<f64> = Vec::new();
        let mut buffer: Option<SampleBuffer<f64>> = None;

        loop {
            if limit.is_some_and(|limit| mono.len() >= limit) {
                break;
            }

            let packet = match opened.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(MediaError::decode(path, e)),
            };

            if packet.track_id() != opened.track_id {
                continue;
            }

            let decoded = match opened.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    log::warn!("{}: skipping corrupt packet ({})", path.display(), e);
                    continue;
                }
                Err(e) => return Err(MediaError::decode(path, e)),
            };

            let spec = *decoded.spec();
            let channels = spec.channels.count();
            let samples = buffer.get_or_insert_with(|| {
                SampleBuffer::<f64>::new(decoded.capacity() as u64, spec)
            });
            if samples.capacity() < decoded.capacity() * channels {
                *samples = SampleBuffer::<f64>::new(decoded.capacity() as u64, spec);
            }
            samples.copy_interleaved_ref(decoded);

            let frames = downmix(samples.samples(), channels);
            let fresh = if skipped < skip {
                let drop = (skip - skipped).min(frames.len());
                skipped += drop;
                &frames[drop..]
            } else {
                &frames[..]
            };
            mono.extend_from_slice(fresh);
        }

        if let Some(limit) = limit {
            mono.truncate(limit);
        }
        Ok(mono)
    }
}

impl MediaBackend for NativeBackend {
    fn decode(&self, request: &DecodeRequest, _scratch_dir: &Path) -> MediaResult<Waveform> {
        let path = request.path.as_path();
        let mut opened = Self::open(path)?;

        let native_rate = opened
            .params
            .sample_rate
            .ok_or_else(|| MediaError::decode(path, "unknown sample rate"))?;

        let skip = (request.start_offset * native_rate as f64).round() as usize;
        let limit = request
            .max_duration
            .is_finite()
            .then(|| (request.max_duration * native_rate as f64).ceil() as usize);

        let mono = Self::decode_native(path, &mut opened, skip, limit)?;
        let mut samples = resample_mono(&mono, native_rate, request.sample_rate)?;
        if let Some(max) = request.max_samples() {
            samples.truncate(max);
        }

        log::debug!(
            "symphonia decoded {} ({} Hz -> {} Hz, {} samples from {:.1}s)",
            path.display(),
            native_rate,
            request.sample_rate,
            samples.len(),
            request.start_offset
        );
        Ok(Waveform::new(samples, request.sample_rate))
    }

    fn probe(&self, path: &Path) -> MediaResult<MediaInfo> {
        let mut opened = Self::open(path)?;
        let sample_rate = opened
            .params
            .sample_rate
            .ok_or_else(|| MediaError::invalid_probe(path, "unknown sample rate"))?;

        let frames = match opened.params.n_frames {
            Some(frames) => frames,
            // Container does not declare a length, count it
            None => Self::decode_native(path, &mut opened, 0, None)?.len() as u64,
        };

        Ok(MediaInfo {
            duration: frames as f64 / sample_rate as f64,
            sample_rate: Some(sample_rate),
            channels: opened.params.channels.map(|c| c.count() as u16),
            has_video: false,
            format_name: path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase),
        })
    }

    fn name(&self) -> &'static str {
        "native"
    }
}
