//! Sample rate conversion via rubato

use rubato::{FftFixedIn, Resampler};
use sf_core::{MediaError, MediaResult};

/// Input frames fed to the resampler per call
const CHUNK_SIZE: usize = 4096;

/// Resample a mono signal from `from` Hz to `to` Hz.
///
/// The resampler's group delay is removed, so sample `n` of the output
/// lines up with time `n / to` of the input.
pub fn resample_mono(samples: &[f64], from: u32, to: u32) -> MediaResult<Vec<f64>> {
    if from == to || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    if from == 0 || to == 0 {
        return Err(MediaError::Resample(format!(
            "invalid sample rates {from} Hz -> {to} Hz"
        )));
    }

    let mut resampler = FftFixedIn::<f64>::new(from as usize, to as usize, CHUNK_SIZE, 2, 1)
        .map_err(|e| MediaError::Resample(e.to_string()))?;

    let expected = (samples.len() as f64 * to as f64 / from as f64).round() as usize;
    let delay = resampler.output_delay();
    let mut output = Vec::with_capacity(expected + delay + CHUNK_SIZE);
    let mut position = 0;

    loop {
        let needed = resampler.input_frames_next();
        if position + needed > samples.len() {
            break;
        }
        let chunk = [&samples[position..position + needed]];
        let frames = resampler
            .process(&chunk[..], None)
            .map_err(|e| MediaError::Resample(e.to_string()))?;
        output.extend_from_slice(&frames[0]);
        position += needed;
    }

    if position < samples.len() {
        let chunk = [&samples[position..]];
        let frames = resampler
            .process_partial(Some(&chunk[..]), None)
            .map_err(|e| MediaError::Resample(e.to_string()))?;
        output.extend_from_slice(&frames[0]);
    }

    // Flush the tail still held back by the group delay
    while output.len() < expected + delay {
        let frames = resampler
            .process_partial(None::<&[&[f64]]>, None)
            .map_err(|e| MediaError::Resample(e.to_string()))?;
        if frames[0].is_empty() {
            break;
        }
        output.extend_from_slice(&frames[0]);
    }

    output.drain(..delay.min(output.len()));
    output.truncate(expected);
    Ok(output)
}
