//! Directory sweeps: flush, scoped removal and leftover cleanup
//!
//! A sweep never stops at the first file it cannot remove. Failures are
//! logged and counted; only an unreadable directory aborts it.

use super::{EntryStore, HASH_HEX_LEN};
use crate::errors::{CacheError, RecoveryHint, Result};
use crate::storage::format::{decode_record, StoredRecord};
use crate::storage::lock::KeyLock;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Temp files younger than this may belong to a writer that has not
/// renamed yet, so flushes leave them alone.
pub const TEMP_FILE_GRACE: Duration = Duration::from_secs(300);

/// Outcome of a directory sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sweep {
    /// Entry files deleted
    pub removed: usize,
    /// Entry files that matched but could not be deleted
    pub failed: usize,
    /// Orphaned temp files and unused lock files deleted
    pub leftovers: usize,
}

impl Sweep {
    fn record(&mut self, path: &Path, outcome: Result<bool>) {
        match outcome {
            Ok(true) => self.removed += 1,
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not remove cache entry");
                self.failed += 1;
            }
        }
    }
}

impl EntryStore {
    /// Paths of every entry file in the store
    pub fn entry_files(&self) -> Result<Vec<PathBuf>> {
        Ok(self
            .regular_files()?
            .into_iter()
            .filter(|(name, _)| self.is_entry_file_name(name))
            .map(|(_, path)| path)
            .collect())
    }

    /// Remove every entry file, then any leftovers of crashed writers and
    /// unused lock files.
    pub fn clear(&self) -> Result<Sweep> {
        let mut sweep = Sweep::default();
        for path in self.entry_files()? {
            let outcome = self.remove_path(&path);
            sweep.record(&path, outcome);
        }
        sweep.leftovers = self.clear_leftovers(SystemTime::now())?;
        Ok(sweep)
    }

    /// Remove entries whose decoded record satisfies `predicate`.
    ///
    /// Files that cannot be decoded cannot be attributed to a key and are
    /// left alone.
    pub fn remove_where<F>(&self, predicate: F) -> Result<Sweep>
    where
        F: Fn(&StoredRecord) -> bool,
    {
        let mut sweep = Sweep::default();
        for path in self.entry_files()? {
            let bytes = match fs::read(&path) {
                Ok(b) => b,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let record = match decode_record(&bytes, &path.to_string_lossy()) {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "skipping undecodable entry");
                    continue;
                }
            };
            if predicate(&record) {
                let outcome = self.remove_path(&path);
                sweep.record(&path, outcome);
            }
        }
        Ok(sweep)
    }

    /// Delete temp files last modified before `now - TEMP_FILE_GRACE` and
    /// lock files nobody holds. Returns how many files were deleted.
    ///
    /// `now` is filesystem time, compared against modification times.
    pub fn clear_leftovers(&self, now: SystemTime) -> Result<usize> {
        let cutoff = now.checked_sub(TEMP_FILE_GRACE).unwrap_or(SystemTime::UNIX_EPOCH);
        let mut removed = 0;

        for (name, path) in self.regular_files()? {
            let outcome = if is_temp_file_name(&name) {
                self.remove_stale_temp(&path, cutoff)
            } else if self.is_lock_file_name(&name) {
                KeyLock::remove_if_unused(&path)
            } else {
                continue;
            };

            match outcome {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "could not remove leftover file");
                }
            }
        }

        Ok(removed)
    }

    fn remove_stale_temp(&self, path: &Path, cutoff: SystemTime) -> Result<bool> {
        let modified = fs::metadata(path).and_then(|meta| meta.modified());
        match modified {
            Ok(modified) if modified < cutoff => match fs::remove_file(path) {
                Ok(()) => Ok(true),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
                Err(e) => Err(CacheError::Io {
                    path: path.to_path_buf(),
                    operation: "remove orphaned temp file",
                    source: e,
                    recovery_hint: RecoveryHint::CheckPermissions {
                        path: path.to_path_buf(),
                    },
                }),
            },
            Ok(_) => Ok(false),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::Io {
                path: path.to_path_buf(),
                operation: "stat temp file",
                source: e,
                recovery_hint: RecoveryHint::Ignore,
            }),
        }
    }

    /// Names and paths of the regular files directly in the base directory
    fn regular_files(&self) -> Result<Vec<(String, PathBuf)>> {
        let dir = match fs::read_dir(&self.base_dir) {
            Ok(d) => d,
            Err(e) => {
                return Err(CacheError::Io {
                    path: self.base_dir.clone(),
                    operation: "list cache directory",
                    source: e,
                    recovery_hint: RecoveryHint::CheckPermissions {
                        path: self.base_dir.clone(),
                    },
                });
            }
        };

        let mut files = Vec::new();
        for dir_entry in dir {
            let dir_entry = match dir_entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            match dir_entry.file_type() {
                Ok(file_type) if file_type.is_file() => {}
                _ => continue,
            }
            let name = dir_entry.file_name().to_string_lossy().into_owned();
            files.push((name, dir_entry.path()));
        }
        Ok(files)
    }

    /// Entry files are `{salt}-{64 hex chars}`; temp and lock files never match.
    fn is_entry_file_name(&self, name: &str) -> bool {
        match self.salted_suffix(name) {
            Some(hash) => is_hex(hash, HASH_HEX_LEN),
            None => false,
        }
    }

    /// Lock files are `{salt}-{64 hex chars}.lock`
    fn is_lock_file_name(&self, name: &str) -> bool {
        match self
            .salted_suffix(name)
            .and_then(|rest| rest.strip_suffix(".lock"))
        {
            Some(hash) => is_hex(hash, HASH_HEX_LEN),
            None => false,
        }
    }

    fn salted_suffix<'a>(&self, name: &'a str) -> Option<&'a str> {
        name.strip_prefix(self.salt.as_str())
            .and_then(|rest| rest.strip_prefix('-'))
    }
}

/// Temp files are `{crc32c:08x}-{uuid simple}.tmp`
fn is_temp_file_name(name: &str) -> bool {
    match name
        .strip_suffix(".tmp")
        .and_then(|stem| stem.split_once('-'))
    {
        Some((crc, id)) => is_hex(crc, 8) && is_hex(id, 32),
        None => false,
    }
}

fn is_hex(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_hexdigit())
}
