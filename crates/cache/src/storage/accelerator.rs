//! Optional in-memory mirror of backing-file presence

use dashmap::DashSet;
use std::path::{Path, PathBuf};

/// A fast presence index consulted before the filesystem.
///
/// A positive answer only short-circuits existence checks. Reads always
/// go to the backing file, so a stale reference left behind by a crash
/// between eviction and file removal surfaces as a miss, never as data.
pub trait AccelerationBackend: Send + Sync {
    /// Whether `path` is currently held by the backend
    fn exists(&self, path: &Path) -> bool;

    /// Evict `path`. Returns false if the backend refused.
    fn invalidate(&self, path: &Path) -> bool;

    /// Called after `path` was written or successfully read.
    fn warm(&self, _path: &Path) {}
}

/// Process-local accelerator backed by a concurrent set
#[derive(Debug, Default)]
pub struct MemoryAccelerator {
    paths: DashSet<PathBuf>,
}

impl MemoryAccelerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl AccelerationBackend for MemoryAccelerator {
    fn exists(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    fn invalidate(&self, path: &Path) -> bool {
        self.paths.remove(path);
        true
    }

    fn warm(&self, path: &Path) {
        self.paths.insert(path.to_path_buf());
    }
}
