//! Memoized media probing

use parking_lot::RwLock;
use sf_core::{MediaBackend, MediaInfo, MediaResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Path → probed metadata, filled on first use and never invalidated
#[derive(Debug, Default)]
pub struct MediaInfoCache {
    entries: RwLock<HashMap<PathBuf, MediaInfo>>,
}

impl MediaInfoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached metadata for `path`, probing through `backend` on a miss
    pub fn get_or_probe<B: MediaBackend + ?Sized>(
        &self,
        path: &Path,
        backend: &B,
    ) -> MediaResult<MediaInfo> {
        if let Some(info) = self.entries.read().get(path) {
            return Ok(info.clone());
        }

        let info = backend.probe(path)?;
        log::debug!(
            "probed {}: {:.3}s, video: {}",
            path.display(),
            info.duration,
            info.has_video
        );

        Ok(self
            .entries
            .write()
            .entry(path.to_path_buf())
            .or_insert(info)
            .clone())
    }

    pub fn get(&self, path: &Path) -> Option<MediaInfo> {
        self.entries.read().get(path).cloned()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.read().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
