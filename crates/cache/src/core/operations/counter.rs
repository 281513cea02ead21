//! Increment and decrement
//!
//! `incr` is a plain read-modify-write: two concurrent increments of the
//! same key can lose an update. The rewrite uses the configured default
//! TTL, so every increment restarts the entry's expiration window.

use crate::core::types::ObjectCache;
use crate::errors::{CacheError, RecoveryHint, Result};
use crate::keys::FullyQualifiedKey;
use crate::storage::StoredRecord;

use super::log_failure;

impl ObjectCache {
    /// Add `offset` to the integer value of an existing key.
    ///
    /// Returns the new value, or `None` if the key does not exist or the
    /// write fails. An existing but expired entry counts from zero. The
    /// backing file decides existence, not the accelerator.
    pub fn incr(&self, key: &str, offset: i64, group: &str) -> Option<i64> {
        let fq = self.inner.namespacer.build_key(key, group);
        match self.try_incr(&fq, offset) {
            Ok(value) => Some(value),
            Err(e) => {
                log_failure("incr", fq.as_str(), &e);
                None
            }
        }
    }

    /// `incr` with a negated offset
    pub fn decr(&self, key: &str, offset: i64, group: &str) -> Option<i64> {
        self.incr(key, offset.saturating_neg(), group)
    }

    /// `incr` holding the key's advisory file lock for the whole
    /// read-modify-write, so cooperating callers never lose updates.
    pub fn incr_exclusive(&self, key: &str, offset: i64, group: &str) -> Option<i64> {
        let fq = self.inner.namespacer.build_key(key, group);
        let result = match self.store() {
            Ok(store) => match store.lock(&fq) {
                Ok(_guard) => self.try_incr(&fq, offset),
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };

        match result {
            Ok(value) => Some(value),
            Err(e) => {
                log_failure("incr_exclusive", fq.as_str(), &e);
                None
            }
        }
    }

    /// `incr_exclusive` with a negated offset
    pub fn decr_exclusive(&self, key: &str, offset: i64, group: &str) -> Option<i64> {
        self.incr_exclusive(key, offset.saturating_neg(), group)
    }

    fn try_incr(&self, fq: &FullyQualifiedKey, offset: i64) -> Result<i64> {
        let store = self.store()?;
        let record = match store.read_record(fq) {
            Ok(Some(record)) => Some(record),
            Ok(None) => {
                return Err(CacheError::NotFound {
                    key: fq.to_string(),
                    recovery_hint: RecoveryHint::Ignore,
                });
            }
            // Present but unreadable: the entry exists and counts from zero.
            Err(e) if e.is_corruption() => {
                tracing::warn!(key = %fq, error = %e, "unreadable counter entry");
                None
            }
            Err(e) => return Err(e),
        };

        let now = self.now();
        let current = record
            .map(StoredRecord::into_entry)
            .filter(|entry| !entry.is_expired(now));
        self.record_lookup(current.is_some());

        let base = current.map(|entry| entry.coerce_integer()).unwrap_or(0);
        let value = base.saturating_add(offset);

        self.write_value(fq, &value, self.inner.config.default_ttl)?;
        Ok(value)
    }
}
