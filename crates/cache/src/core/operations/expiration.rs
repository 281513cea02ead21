//! Expiration extension

use crate::core::types::ObjectCache;
use crate::entry::Entry;
use crate::errors::{CacheError, RecoveryHint, Result};
use crate::keys::FullyQualifiedKey;

use super::report;

/// Extension applied when a caller has no specific duration in mind
pub const DEFAULT_EXTENSION_SECS: u64 = 60;

impl ObjectCache {
    /// Push the expiry of `key` back by `seconds`, counted from the
    /// entry's current expiry rather than from now. The value is kept.
    ///
    /// Works on entries that have already expired but still exist.
    /// Returns false if there is no entry.
    pub fn extend_expiration(&self, key: &str, group: &str, seconds: u64) -> bool {
        let fq = self.inner.namespacer.build_key(key, group);
        report(
            "extend_expiration",
            fq.as_str(),
            self.try_extend_expiration(&fq, seconds),
        )
    }

    fn try_extend_expiration(&self, fq: &FullyQualifiedKey, seconds: u64) -> Result<()> {
        let store = self.store()?;
        let record = match store.read_record(fq)? {
            Some(record) => record,
            None => {
                return Err(CacheError::NotFound {
                    key: fq.to_string(),
                    recovery_hint: RecoveryHint::Ignore,
                });
            }
        };

        let extension = i64::try_from(seconds).unwrap_or(i64::MAX);
        let expires_at = record.expires_at.saturating_add(extension);
        store.write(fq, Entry::new(record.value, expires_at))
    }
}
