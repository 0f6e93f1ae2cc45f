//! Known lower bounds on per-file delays

use crate::{AlignError, AlignResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// File index → seconds the file is known to be delayed by, at least.
///
/// The aligner starts decoding each hinted file that far in, so long
/// recordings with a large known offset need not be read from the start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnownDelayHints(BTreeMap<usize, f64>);

impl KnownDelayHints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object such as `{"1": 120}`
    pub fn from_json(json: &str) -> AlignResult<Self> {
        let raw: BTreeMap<String, f64> = serde_json::from_str(json)
            .map_err(|e| AlignError::InvalidHint(format!("{json}: {e}")))?;

        let mut hints = Self::new();
        for (key, seconds) in raw {
            let index = key.trim().parse::<usize>().map_err(|_| {
                AlignError::InvalidHint(format!("'{key}' is not a file index"))
            })?;
            hints.insert(index, seconds)?;
        }
        Ok(hints)
    }

    /// Builder pattern: add a hint
    pub fn with(mut self, index: usize, seconds: f64) -> AlignResult<Self> {
        self.insert(index, seconds)?;
        Ok(self)
    }

    /// Set the hint for file `index`
    pub fn insert(&mut self, index: usize, seconds: f64) -> AlignResult<()> {
        if !(seconds.is_finite() && seconds >= 0.0) {
            return Err(AlignError::InvalidHint(format!(
                "delay for file {index} must be a non-negative number of seconds, got {seconds}"
            )));
        }
        self.0.insert(index, seconds);
        Ok(())
    }

    /// Hints derived from a coarse pass: `max(0, trim - margin)` for every file
    pub fn refined(trims: impl IntoIterator<Item = f64>, margin: f64) -> Self {
        Self(
            trims
                .into_iter()
                .map(|trim| (trim - margin).max(0.0))
                .enumerate()
                .collect(),
        )
    }

    /// Check every index refers to one of `file_count` inputs
    pub fn validate(&self, file_count: usize) -> AlignResult<()> {
        match self.0.keys().find(|&&index| index >= file_count) {
            Some(index) => Err(AlignError::InvalidHint(format!(
                "file index {index} is out of range for {file_count} files"
            ))),
            None => Ok(()),
        }
    }

    /// Hint for file `index`, zero when unset
    pub fn get(&self, index: usize) -> f64 {
        self.0.get(&index).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains_key(&index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.0.iter().map(|(&index, &seconds)| (index, seconds))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
