//! Persistent entry store
//!
//! One file per entry, named `{salt}-{sha256(fully qualified key)}` inside
//! the base directory. Writes land in a uniquely named temp file that is
//! renamed over the entry file, so readers see either the previous record
//! or the new one in full.

mod reader;
mod sweep;
mod writer;

pub use sweep::{Sweep, TEMP_FILE_GRACE};

use crate::errors::{CacheError, RecoveryHint, Result};
use crate::keys::FullyQualifiedKey;
use crate::storage::accelerator::AccelerationBackend;
use crate::storage::lock::KeyLock;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Length of a hex-encoded SHA-256 digest
const HASH_HEX_LEN: usize = 64;

/// Durable fully-qualified-key -> entry storage
pub struct EntryStore {
    base_dir: PathBuf,
    salt: String,
    accelerator: Option<Arc<dyn AccelerationBackend>>,
}

impl EntryStore {
    /// Open (creating if needed) a store rooted at `base_dir`
    pub fn open(
        base_dir: impl Into<PathBuf>,
        salt: impl Into<String>,
        accelerator: Option<Arc<dyn AccelerationBackend>>,
    ) -> Result<Self> {
        let base_dir = base_dir.into();

        match fs::create_dir_all(&base_dir) {
            Ok(()) => {}
            Err(e) => {
                return Err(CacheError::Io {
                    path: base_dir.clone(),
                    operation: "create cache directory",
                    source: e,
                    recovery_hint: RecoveryHint::CheckPermissions { path: base_dir },
                });
            }
        }

        match fs::metadata(&base_dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(CacheError::Configuration {
                    message: format!("{} is not a directory", base_dir.display()),
                    recovery_hint: RecoveryHint::UpdateConfiguration,
                });
            }
            Err(e) => {
                return Err(CacheError::Io {
                    path: base_dir.clone(),
                    operation: "stat cache directory",
                    source: e,
                    recovery_hint: RecoveryHint::CheckPermissions { path: base_dir },
                });
            }
        }

        Ok(Self {
            base_dir,
            salt: salt.into(),
            accelerator,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn has_accelerator(&self) -> bool {
        self.accelerator.is_some()
    }

    /// Canonical file location for `key`
    pub fn entry_path(&self, key: &FullyQualifiedKey) -> PathBuf {
        self.base_dir
            .join(format!("{}-{}", self.salt, hash_key(key.as_str())))
    }

    /// Location of the advisory lock file for `key`
    pub fn lock_path(&self, key: &FullyQualifiedKey) -> PathBuf {
        self.base_dir
            .join(format!("{}-{}.lock", self.salt, hash_key(key.as_str())))
    }

    /// Hold the advisory lock for `key` until the guard is dropped
    pub fn lock(&self, key: &FullyQualifiedKey) -> Result<KeyLock> {
        KeyLock::acquire(&self.lock_path(key))
    }

    /// Whether an entry exists for `key`, consulting the accelerator first.
    ///
    /// Expired entries still exist until overwritten or flushed.
    pub fn exists(&self, key: &FullyQualifiedKey) -> bool {
        let path = self.entry_path(key);
        if let Some(accel) = &self.accelerator {
            if accel.exists(&path) {
                return true;
            }
        }
        path.is_file()
    }

    /// Like `exists`, but always answered by the backing file.
    ///
    /// A stale accelerator reference is evicted and reported as absent.
    pub fn confirm_exists(&self, key: &FullyQualifiedKey) -> bool {
        let path = self.entry_path(key);
        if path.is_file() {
            return true;
        }
        self.forget(&path);
        false
    }

    /// Drop any accelerator reference to `path`
    pub(super) fn forget(&self, path: &Path) {
        if let Some(accel) = &self.accelerator {
            if accel.exists(path) && !accel.invalidate(path) {
                tracing::warn!(path = %path.display(), "accelerator refused invalidation");
            }
        }
    }

    /// Remove the entry for `key`. An absent entry counts as removed.
    ///
    /// Returns whether a file was actually deleted.
    pub fn invalidate(&self, key: &FullyQualifiedKey) -> Result<bool> {
        self.remove_path(&self.entry_path(key))
    }

    pub(super) fn remove_path(&self, path: &Path) -> Result<bool> {
        self.forget(path);

        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::Io {
                path: path.to_path_buf(),
                operation: "remove cache entry file",
                source: e,
                recovery_hint: RecoveryHint::CheckPermissions {
                    path: path.to_path_buf(),
                },
            }),
        }
    }
}

impl fmt::Debug for EntryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryStore")
            .field("base_dir", &self.base_dir)
            .field("salt", &self.salt)
            .field("accelerated", &self.accelerator.is_some())
            .finish()
    }
}

/// Hash a fully-qualified key using SHA-256
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests;
