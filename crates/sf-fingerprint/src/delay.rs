//! Histogram voting over shared landmarks

use crate::summary::FrequencyTransitionSummary;
use crate::{FingerprintError, FingerprintResult};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Vote count per candidate delay (in window units)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelayHistogram {
    votes: BTreeMap<i64, u64>,
}

impl DelayHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one vote for `delay`
    pub fn vote(&mut self, delay: i64) {
        *self.votes.entry(delay).or_insert(0) += 1;
    }

    /// Votes cast for `delay`
    pub fn votes(&self, delay: i64) -> u64 {
        self.votes.get(&delay).copied().unwrap_or(0)
    }

    /// Total number of votes cast
    pub fn total_votes(&self) -> u64 {
        self.votes.values().sum()
    }

    /// Number of distinct candidate delays
    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// Candidates in ascending delay order
    pub fn iter(&self) -> impl Iterator<Item = (i64, u64)> + '_ {
        self.votes.iter().map(|(&delay, &count)| (delay, count))
    }

    /// Most voted delay and its count.
    ///
    /// Ties go to the delay closest to zero, then to the negative one.
    pub fn winner(&self) -> Option<(i64, u64)> {
        self.iter()
            .max_by_key(|&(delay, count)| (count, Reverse(delay.unsigned_abs()), Reverse(delay)))
    }

    /// Vote count of the best candidate other than the winner
    pub fn runner_up_votes(&self) -> u64 {
        let Some((best, _)) = self.winner() else {
            return 0;
        };
        self.iter()
            .filter(|&(delay, _)| delay != best)
            .map(|(_, count)| count)
            .max()
            .unwrap_or(0)
    }
}

/// Outcome of comparing two summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayEstimate {
    /// Winning `sample - reference` offset in window units
    pub delay_windows: i64,

    /// Votes for the winning delay
    pub votes: u64,

    /// Votes for the strongest competing delay
    pub runner_up_votes: u64,

    /// Frequency bins present in both summaries
    pub shared_bins: usize,
}

impl DelayEstimate {
    /// Convert the window offset to seconds
    pub fn seconds(&self, fft_bin_size: usize, sample_rate: u32) -> f64 {
        let windows_per_second = sample_rate as f64 / fft_bin_size as f64;
        self.delay_windows as f64 / windows_per_second
    }
}

/// Vote every (sample, reference) landmark pair of each shared bin
pub fn delay_histogram(
    reference: &FrequencyTransitionSummary,
    sample: &FrequencyTransitionSummary,
) -> FingerprintResult<(DelayHistogram, usize)> {
    let mut histogram = DelayHistogram::new();
    let mut shared = 0;

    for bin in reference.shared_bins(sample) {
        shared += 1;
        for &sample_window in sample.windows(bin) {
            for &reference_window in reference.windows(bin) {
                histogram.vote(sample_window as i64 - reference_window as i64);
            }
        }
    }

    if shared == 0 {
        return Err(FingerprintError::NoMatch);
    }
    Ok((histogram, shared))
}

/// Find the most supported delay of `sample` relative to `reference`
pub fn find_delay(
    reference: &FrequencyTransitionSummary,
    sample: &FrequencyTransitionSummary,
) -> FingerprintResult<DelayEstimate> {
    let (histogram, shared_bins) = delay_histogram(reference, sample)?;
    let (delay_windows, votes) = histogram.winner().ok_or(FingerprintError::NoMatch)?;

    Ok(DelayEstimate {
        delay_windows,
        votes,
        runner_up_votes: histogram.runner_up_votes(),
        shared_bins,
    })
}

/// Delay of `sample` relative to `reference` in seconds.
///
/// Positive when the sample lags the reference, i.e. a shared event
/// occurs later in the sample's timeline.
pub fn estimate_delay(
    reference: &FrequencyTransitionSummary,
    sample: &FrequencyTransitionSummary,
    fft_bin_size: usize,
    sample_rate: u32,
) -> FingerprintResult<f64> {
    Ok(find_delay(reference, sample)?.seconds(fft_bin_size, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn summary(points: &[(usize, usize)]) -> FrequencyTransitionSummary {
        points.iter().copied().collect()
    }

    #[test]
    fn test_consistent_shift_wins() {
        let reference = summary(&[(5, 10), (5, 20), (7, 30), (9, 2)]);
        let sample = summary(&[(5, 13), (5, 23), (7, 33), (11, 4)]);

        let estimate = find_delay(&reference, &sample).unwrap();
        assert_eq!(estimate.delay_windows, 3);
        assert_eq!(estimate.votes, 3);
        assert_eq!(estimate.shared_bins, 2);

        let seconds = estimate_delay(&reference, &sample, 1024, 8192).unwrap();
        assert_relative_eq!(seconds, 0.375);
    }

    #[test]
    fn test_negative_delay() {
        let reference = summary(&[(1, 50), (2, 60)]);
        let sample = summary(&[(1, 40), (2, 50)]);

        let seconds = estimate_delay(&reference, &sample, 1024, 48000).unwrap();
        assert_relative_eq!(seconds, -10.0 * 1024.0 / 48000.0);
    }

    #[test]
    fn test_no_shared_bins() {
        let reference = summary(&[(1, 0), (2, 1)]);
        let sample = summary(&[(3, 0), (4, 1)]);

        assert!(matches!(
            find_delay(&reference, &sample),
            Err(FingerprintError::NoMatch)
        ));
        assert!(matches!(
            find_delay(&FrequencyTransitionSummary::new(), &sample),
            Err(FingerprintError::NoMatch)
        ));
    }

    #[test]
    fn test_histogram_counts_all_pairs() {
        let reference = summary(&[(4, 0), (4, 5)]);
        let sample = summary(&[(4, 2), (4, 7), (4, 9)]);

        let (histogram, shared) = delay_histogram(&reference, &sample).unwrap();
        assert_eq!(shared, 1);
        assert_eq!(histogram.total_votes(), 6);
        assert_eq!(histogram.votes(2), 2);
        assert_eq!(histogram.votes(-3), 1);
        assert_eq!(histogram.votes(7), 1);
        assert_eq!(histogram.votes(9), 1);
        assert_eq!(histogram.votes(4), 1);
        assert_eq!(histogram.winner(), Some((2, 2)));
        assert_eq!(histogram.runner_up_votes(), 1);
    }

    #[test]
    fn test_tie_prefers_smallest_magnitude() {
        let mut histogram = DelayHistogram::new();
        histogram.vote(3);
        histogram.vote(-1);
        histogram.vote(7);
        assert_eq!(histogram.winner(), Some((-1, 1)));
    }

    #[test]
    fn test_tie_prefers_negative_on_equal_magnitude() {
        let reference = summary(&[(1, 10), (2, 10)]);
        let sample = summary(&[(1, 12), (2, 8)]);

        let estimate = find_delay(&reference, &sample).unwrap();
        assert_eq!(estimate.delay_windows, -2);
        assert_eq!(estimate.runner_up_votes, 1);
    }

    #[test]
    fn test_empty_histogram_has_no_winner() {
        let histogram = DelayHistogram::new();
        assert!(histogram.is_empty());
        assert_eq!(histogram.winner(), None);
        assert_eq!(histogram.runner_up_votes(), 0);
    }
}
