//! Raw offsets → pad/trim edit records

use serde::{Deserialize, Serialize};

use crate::hints::KnownDelayHints;

/// How one file has to be cut or padded to line up with the others.
///
/// All values are seconds and never negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentRecord {
    /// Media to cut from the beginning
    #[serde(rename = "trim")]
    pub trim_pre: f64,

    /// Silence to add before the beginning
    #[serde(rename = "pad")]
    pub pad_pre: f64,

    /// Probed duration of the untouched file
    pub orig_duration: f64,

    /// Media to cut from the end
    pub trim_post: f64,

    /// Silence to add after the end
    pub pad_post: f64,
}

/// Undo the start offsets introduced by decoding hinted files late.
///
/// Every hint is added to all offsets and removed again from its own file,
/// which keeps the offsets of unhinted files relative to each other.
pub fn recenter(offsets: &mut [f64], hints: &KnownDelayHints) {
    if hints.is_empty() {
        return;
    }
    for (index, seconds) in hints.iter() {
        if index >= offsets.len() {
            continue;
        }
        for offset in offsets.iter_mut() {
            *offset += seconds;
        }
        offsets[index] -= seconds;
    }
}

fn min_of(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::INFINITY, f64::min)
}

fn max_of(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::NEG_INFINITY, f64::max)
}

/// Turn per-file offsets and durations into edit records.
///
/// The earliest-starting file gets no leading pad, the one that ends first
/// after its leading trim gets no trailing trim.
pub fn normalize(offsets: &[f64], durations: &[f64]) -> Vec<AlignmentRecord> {
    debug_assert_eq!(offsets.len(), durations.len());
    if offsets.is_empty() {
        return Vec::new();
    }

    let earliest = min_of(offsets.iter().copied());
    let pad_pre: Vec<f64> = offsets.iter().map(|o| o - earliest).collect();
    let latest = max_of(pad_pre.iter().copied());

    let end = max_of(pad_pre.iter().zip(durations).map(|(p, d)| p + d));
    let shortest = min_of(
        pad_pre
            .iter()
            .zip(durations)
            .map(|(p, d)| d - (latest - p)),
    );

    pad_pre
        .iter()
        .zip(durations)
        .map(|(&pad, &duration)| {
            let trim = latest - pad;
            AlignmentRecord {
                trim_pre: trim,
                pad_pre: pad,
                orig_duration: duration,
                trim_post: (duration - trim) - shortest,
                pad_post: end - (pad + duration),
            }
        })
        .collect()
}
