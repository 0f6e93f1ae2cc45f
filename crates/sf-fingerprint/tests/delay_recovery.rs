//! Delay Recovery Tests
//!
//! Builds summaries of a synthetic recording and of shifted copies of it,
//! then checks that histogram voting recovers the shift to within one
//! window of time resolution.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use sf_core::Waveform;
use sf_fingerprint::{
    build_summary, estimate_delay, find_delay, FingerprintConfig, FingerprintError,
    SummaryBuilder,
};
use std::f64::consts::PI;

const SAMPLE_RATE: u32 = 8000;

/// Half-second "notes": three random partials with a percussive decay
fn generate_scene(seconds: f64, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let segment = (SAMPLE_RATE / 2) as usize;
    let len = (seconds * SAMPLE_RATE as f64) as usize;

    let notes: Vec<[(f64, f64); 3]> = (0..len.div_ceil(segment))
        .map(|_| {
            [0; 3].map(|_| {
                (
                    rng.random_range(200.0..3000.0),
                    rng.random_range(0.2..1.0),
                )
            })
        })
        .collect();

    (0..len)
        .map(|i| {
            let t = (i % segment) as f64 / SAMPLE_RATE as f64;
            let envelope = (-4.0 * t).exp();
            let time = i as f64 / SAMPLE_RATE as f64;
            notes[i / segment]
                .iter()
                .map(|&(freq, amp)| amp * envelope * (2.0 * PI * freq * time).sin())
                .sum::<f64>()
                * 0.3
                + (rng.random::<f64>() - 0.5) * 0.01
        })
        .collect()
}

/// `signal` preceded by `lag` samples of faint noise
fn delayed(signal: &[f64], lag: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..lag)
        .map(|_| (rng.random::<f64>() - 0.5) * 0.01)
        .chain(signal.iter().copied())
        .collect()
}

fn generate_tone(seconds: f64, freq: f64) -> Vec<f64> {
    (0..(seconds * SAMPLE_RATE as f64) as usize)
        .map(|i| (2.0 * PI * freq * i as f64 / SAMPLE_RATE as f64).sin())
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// SHIFT RECOVERY
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_recovers_lag_within_one_window() {
    let config = FingerprintConfig::default();
    let builder = SummaryBuilder::new(&config).unwrap();
    let resolution = config.window_duration(SAMPLE_RATE);

    let scene = generate_scene(30.0, 42);
    let reference = builder.build(&scene).unwrap();

    for lag in [0usize, 1024 * 5 + 37, 1024 * 12 + 300, 1024 * 31] {
        let sample = builder.build(&delayed(&scene, lag, 9)).unwrap();
        let seconds = estimate_delay(&reference, &sample, config.fft_bin_size, SAMPLE_RATE).unwrap();
        let expected = lag as f64 / SAMPLE_RATE as f64;

        assert!(
            (seconds - expected).abs() <= resolution,
            "lag {lag}: estimated {seconds:.3}s, expected {expected:.3}s"
        );
    }
}

#[test]
fn test_recovers_lead_as_negative_delay() {
    let config = FingerprintConfig::default();
    let scene = generate_scene(30.0, 7);
    let lead = 8192 * 2;

    let reference = build_summary(&Waveform::new(scene.clone(), SAMPLE_RATE), &config).unwrap();
    let sample = build_summary(
        &Waveform::new(scene[lead..].to_vec(), SAMPLE_RATE),
        &config,
    )
    .unwrap();

    let seconds = estimate_delay(&reference, &sample, config.fft_bin_size, SAMPLE_RATE).unwrap();
    let expected = -(lead as f64) / SAMPLE_RATE as f64;
    assert!((seconds - expected).abs() <= config.window_duration(SAMPLE_RATE));
}

#[test]
fn test_winner_clearly_beats_runner_up() {
    let config = FingerprintConfig::dense();
    let builder = SummaryBuilder::new(&config).unwrap();
    let scene = generate_scene(20.0, 3);

    let reference = builder.build(&scene).unwrap();
    let sample = builder.build(&delayed(&scene, 1024 * 8, 1)).unwrap();

    let estimate = find_delay(&reference, &sample).unwrap();
    assert_eq!(estimate.delay_windows, 8);
    assert!(estimate.votes > estimate.runner_up_votes);
}

// ═══════════════════════════════════════════════════════════════════════════════
// NO MATCH
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_disjoint_tones_do_not_match() {
    let config = FingerprintConfig::default();
    let builder = SummaryBuilder::new(&config).unwrap();

    // 7.8125 Hz per bin: 500 Hz sits on bin 64, 1500 Hz on bin 192
    let low = builder.build(&generate_tone(5.0, 500.0)).unwrap();
    let high = builder.build(&generate_tone(5.0, 1500.0)).unwrap();

    assert!(low.contains_bin(64));
    assert!(high.contains_bin(192));
    assert!(matches!(
        estimate_delay(&low, &high, config.fft_bin_size, SAMPLE_RATE),
        Err(FingerprintError::NoMatch)
    ));
}
