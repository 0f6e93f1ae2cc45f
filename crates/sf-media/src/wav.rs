//! WAV reading/writing via hound

use sf_core::{MediaError, MediaResult, Waveform};
use std::path::Path;

/// Read a WAV file and average all channels down to mono
pub fn read_wav_mono(path: &Path) -> MediaResult<Waveform> {
    let reader = hound::WavReader::open(path).map_err(|e| MediaError::decode(path, e))?;

    let spec = reader.spec();
    let num_channels = spec.channels.max(1) as usize;

    let samples: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(|v| v as f64))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| MediaError::decode(path, e))?,
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f64;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f64 / max_val))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| MediaError::decode(path, e))?
        }
    };

    Ok(Waveform::new(
        downmix(&samples, num_channels),
        spec.sample_rate,
    ))
}

/// Write a mono 16-bit WAV file
pub fn write_wav_mono(path: &Path, waveform: &Waveform) -> MediaResult<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: waveform.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(|e| MediaError::decode(path, e))?;
    for &sample in &waveform.samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f64).round() as i16;
        writer
            .write_sample(value)
            .map_err(|e| MediaError::decode(path, e))?;
    }
    writer.finalize().map_err(|e| MediaError::decode(path, e))
}

/// Average interleaved frames into a single channel
pub fn downmix(interleaved: &[f64], channels: usize) -> Vec<f64> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    let scale = 1.0 / channels as f64;
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f64>() * scale)
        .collect()
}
