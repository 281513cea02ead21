//! Advisory per-key file locks
//!
//! Plain `incr`/`decr` never lock. Callers that need increments to be
//! serialized across processes use the `*_exclusive` variants, which hold
//! one of these locks around their read-modify-write.

use crate::errors::{CacheError, RecoveryHint, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// Exclusive advisory lock on a key's lock file, released on drop.
///
/// Lock files may be removed by a flush while nobody holds them. A waiter
/// that wins the lock on an unlinked inode notices and retries on the
/// current file, so at most one holder exists per path.
#[derive(Debug)]
pub struct KeyLock {
    file: File,
    path: PathBuf,
}

impl KeyLock {
    /// Block until the lock at `path` is held
    pub fn acquire(path: &Path) -> Result<Self> {
        loop {
            let file = open_lock_file(path)?;
            match file.lock_exclusive() {
                Ok(()) => {}
                Err(e) => {
                    return Err(CacheError::Io {
                        path: path.to_path_buf(),
                        operation: "acquire key lock",
                        source: e,
                        recovery_hint: RecoveryHint::Retry {
                            after: std::time::Duration::from_millis(10),
                        },
                    });
                }
            }

            if still_linked(&file, path) {
                return Ok(Self {
                    file,
                    path: path.to_path_buf(),
                });
            }
            tracing::trace!(path = %path.display(), "lock file replaced while waiting, retrying");
        }
    }

    /// Delete the lock file at `path` if no one holds it.
    ///
    /// Returns whether the file was removed.
    pub fn remove_if_unused(path: &Path) -> Result<bool> {
        let file = match OpenOptions::new().write(true).open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => {
                return Err(CacheError::Io {
                    path: path.to_path_buf(),
                    operation: "open key lock file",
                    source: e,
                    recovery_hint: RecoveryHint::CheckPermissions {
                        path: path.to_path_buf(),
                    },
                });
            }
        };

        if file.try_lock_exclusive().is_err() {
            return Ok(false);
        }

        let removed = match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::Io {
                path: path.to_path_buf(),
                operation: "remove key lock file",
                source: e,
                recovery_hint: RecoveryHint::CheckPermissions {
                    path: path.to_path_buf(),
                },
            }),
        };
        let _ = FileExt::unlock(&file);
        removed
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for KeyLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn open_lock_file(path: &Path) -> Result<File> {
    match OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
    {
        Ok(f) => Ok(f),
        Err(e) => Err(CacheError::Io {
            path: path.to_path_buf(),
            operation: "open key lock file",
            source: e,
            recovery_hint: RecoveryHint::CheckPermissions {
                path: path.to_path_buf(),
            },
        }),
    }
}

/// Whether `path` still names the inode `file` was opened from
#[cfg(unix)]
fn still_linked(file: &File, path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (file.metadata(), fs::metadata(path)) {
        (Ok(held), Ok(current)) => held.dev() == current.dev() && held.ino() == current.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn still_linked(_file: &File, path: &Path) -> bool {
    path.is_file()
}
