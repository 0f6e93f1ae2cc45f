//! Backend Integration Tests
//!
//! Round trips through real files on disk. The ffmpeg tests are skipped
//! when ffmpeg is not installed.

use approx::assert_abs_diff_eq;
use sf_core::{DecodeRequest, MediaBackend, Waveform};
use sf_media::{read_wav_mono, write_wav_mono, FfmpegBackend, NativeBackend};
use std::f64::consts::PI;
use std::path::Path;
use std::process::{Command, Stdio};

fn chirp(seconds: f64, sample_rate: u32) -> Waveform {
    let len = (seconds * sample_rate as f64) as usize;
    let samples = (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            0.5 * (2.0 * PI * (200.0 + 40.0 * t) * t).sin()
        })
        .collect();
    Waveform::new(samples, sample_rate)
}

fn write_fixture(dir: &Path, name: &str, waveform: &Waveform) -> std::path::PathBuf {
    let path = dir.join(name);
    write_wav_mono(&path, waveform).unwrap();
    path
}

fn ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

// ═══════════════════════════════════════════════════════════════════════════════
// WAV
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_wav_roundtrip_preserves_rate_and_length() {
    let dir = tempfile::tempdir().unwrap();
    let original = chirp(1.5, 22050);
    let path = write_fixture(dir.path(), "chirp.wav", &original);

    let loaded = read_wav_mono(&path).unwrap();
    assert_eq!(loaded.sample_rate, 22050);
    assert_eq!(loaded.len(), original.len());
    // 16-bit quantization
    assert_abs_diff_eq!(loaded.peak(), original.peak(), epsilon = 1e-3);
}

// ═══════════════════════════════════════════════════════════════════════════════
// NATIVE BACKEND
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_native_probe_duration() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "ten.wav", &chirp(10.0, 44100));

    let info = NativeBackend::new().probe(&path).unwrap();
    assert_abs_diff_eq!(info.duration, 10.0, epsilon = 1e-6);
    assert_eq!(info.sample_rate, Some(44100));
    assert_eq!(info.channels, Some(1));
    assert!(!info.has_video);
}

#[test]
fn test_native_decode_offset_and_limit() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "ten.wav", &chirp(10.0, 44100));

    let request = DecodeRequest::new(&path, 8000).starting_at(2.0).limited_to(3.0);
    let waveform = NativeBackend::new().decode(&request, dir.path()).unwrap();

    assert_eq!(waveform.sample_rate, 8000);
    assert_eq!(waveform.len(), 24000);
}

#[test]
fn test_native_decode_past_end_is_short() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "two.wav", &chirp(2.0, 8000));

    let request = DecodeRequest::new(&path, 8000).starting_at(1.5).limited_to(30.0);
    let waveform = NativeBackend::new().decode(&request, dir.path()).unwrap();
    assert_eq!(waveform.len(), 4000);

    let request = DecodeRequest::new(&path, 8000).starting_at(5.0).limited_to(30.0);
    assert!(NativeBackend::new().decode(&request, dir.path()).unwrap().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════════
// FFMPEG BACKEND
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_ffmpeg_decode_leaves_scratch_clean() {
    if !ffmpeg_available() {
        eprintln!("ffmpeg not installed, skipping");
        return;
    }

    let media = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let path = write_fixture(media.path(), "ten.wav", &chirp(10.0, 44100));

    let backend = FfmpegBackend::new();
    let request = DecodeRequest::new(&path, 3675).starting_at(1.0).limited_to(4.0);
    let waveform = backend.decode(&request, scratch.path()).unwrap();

    assert_eq!(waveform.sample_rate, 3675);
    assert!((waveform.len() as i64 - 14700).abs() <= 2);
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);

    let info = backend.probe(&path).unwrap();
    assert_abs_diff_eq!(info.duration, 10.0, epsilon = 0.01);
}
