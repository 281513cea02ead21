//! Atomic entry writes

use super::EntryStore;
use crate::entry::Entry;
use crate::errors::{CacheError, RecoveryHint, Result};
use crate::keys::FullyQualifiedKey;
use crate::storage::format::{encode_record, StoredRecord};
use crc32c::crc32c;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

impl EntryStore {
    /// Write `entry` for `key` via temp file and atomic rename.
    ///
    /// On failure the previous entry (or its absence) is left untouched.
    pub fn write(&self, key: &FullyQualifiedKey, entry: Entry) -> Result<()> {
        let never_expires = entry.never_expires();
        let record = StoredRecord::new(key.parts().clone(), entry);
        let bytes = encode_record(&record)?;

        let entry_path = self.entry_path(key);
        let temp_path = self.temp_path(key);

        match write_synced(&temp_path, &bytes) {
            Ok(()) => {}
            Err(e) => {
                let _ = fs::remove_file(&temp_path);
                return Err(CacheError::Io {
                    path: temp_path,
                    operation: "write temporary cache file",
                    source: e,
                    recovery_hint: RecoveryHint::CheckDiskSpace,
                });
            }
        }

        match fs::rename(&temp_path, &entry_path) {
            Ok(()) => {}
            Err(e) => {
                let _ = fs::remove_file(&temp_path);
                return Err(CacheError::Io {
                    path: entry_path,
                    operation: "atomic rename",
                    source: e,
                    recovery_hint: RecoveryHint::Retry {
                        after: Duration::from_millis(10),
                    },
                });
            }
        }

        if let Some(accel) = &self.accelerator {
            accel.warm(&entry_path);
        }

        tracing::trace!(
            key = %key,
            bytes = bytes.len(),
            never_expires,
            "wrote cache entry"
        );
        Ok(())
    }

    /// A temp path no other writer, in any process, will pick
    fn temp_path(&self, key: &FullyQualifiedKey) -> PathBuf {
        self.base_dir.join(format!(
            "{:08x}-{}.tmp",
            crc32c(key.as_str().as_bytes()),
            uuid::Uuid::new_v4().simple()
        ))
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
