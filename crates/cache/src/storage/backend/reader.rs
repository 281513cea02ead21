//! Entry reads with lazy expiration

use super::EntryStore;
use crate::entry::Entry;
use crate::errors::{CacheError, RecoveryHint, Result};
use crate::keys::FullyQualifiedKey;
use crate::storage::format::{decode_record, StoredRecord};
use std::fs;
use std::time::Duration;

impl EntryStore {
    /// Load the live entry for `key`.
    ///
    /// `Ok(None)` covers both a missing file and an entry that expired
    /// before `now`. Expired files are not removed.
    pub fn read(&self, key: &FullyQualifiedKey, now: i64) -> Result<Option<Entry>> {
        match self.read_record(key)? {
            Some(record) if record.expires_at < now => {
                tracing::debug!(key = %key, expires_at = record.expires_at, now, "entry expired");
                Ok(None)
            }
            Some(record) => Ok(Some(record.into_entry())),
            None => Ok(None),
        }
    }

    /// Load the record for `key` regardless of its expiry.
    ///
    /// A missing file also clears any stale accelerator reference.
    pub fn read_record(&self, key: &FullyQualifiedKey) -> Result<Option<StoredRecord>> {
        let path = self.entry_path(key);

        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.forget(&path);
                return Ok(None);
            }
            Err(e) => {
                return Err(CacheError::Io {
                    path,
                    operation: "read cache entry file",
                    source: e,
                    recovery_hint: RecoveryHint::Retry {
                        after: Duration::from_millis(10),
                    },
                });
            }
        };

        let record = decode_record(&bytes, key.as_str())?;
        if record.key != *key.parts() {
            return Err(CacheError::Corruption {
                key: key.to_string(),
                reason: format!("entry file holds key '{}'", record.key.render()),
                recovery_hint: RecoveryHint::ClearAndRetry,
            });
        }

        if let Some(accel) = &self.accelerator {
            accel.warm(&path);
        }

        Ok(Some(record))
    }
}
