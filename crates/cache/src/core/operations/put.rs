//! Cache write operations: add, set, replace

use crate::core::types::ObjectCache;
use crate::entry::{expiration, Entry};
use crate::errors::{CacheError, RecoveryHint, Result};
use crate::keys::FullyQualifiedKey;
use serde::Serialize;

use super::report;

impl ObjectCache {
    /// Store `value` only if `key` does not exist yet.
    ///
    /// Fails when the host has suspended cache additions or the key
    /// exists, even if its entry has expired but not been overwritten.
    pub fn add<T>(&self, key: &str, value: &T, group: &str, ttl_secs: u64) -> bool
    where
        T: Serialize + ?Sized,
    {
        let fq = self.inner.namespacer.build_key(key, group);
        report("add", fq.as_str(), self.try_add(&fq, value, ttl_secs))
    }

    /// Store `value` unconditionally. A TTL of 0 never expires.
    pub fn set<T>(&self, key: &str, value: &T, group: &str, ttl_secs: u64) -> bool
    where
        T: Serialize + ?Sized,
    {
        let fq = self.inner.namespacer.build_key(key, group);
        report("set", fq.as_str(), self.write_value(&fq, value, ttl_secs))
    }

    /// Overwrite `key` only if it already exists
    pub fn replace<T>(&self, key: &str, value: &T, group: &str, ttl_secs: u64) -> bool
    where
        T: Serialize + ?Sized,
    {
        let fq = self.inner.namespacer.build_key(key, group);
        report("replace", fq.as_str(), self.try_replace(&fq, value, ttl_secs))
    }

    fn try_add<T>(&self, fq: &FullyQualifiedKey, value: &T, ttl_secs: u64) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        if self.inner.suspension.writes_suspended() {
            return Err(CacheError::WritesSuspended {
                key: fq.to_string(),
                recovery_hint: RecoveryHint::Ignore,
            });
        }

        if self.store()?.confirm_exists(fq) {
            return Err(CacheError::AlreadyExists {
                key: fq.to_string(),
                recovery_hint: RecoveryHint::Ignore,
            });
        }

        self.write_value(fq, value, ttl_secs)
    }

    fn try_replace<T>(&self, fq: &FullyQualifiedKey, value: &T, ttl_secs: u64) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        if !self.store()?.confirm_exists(fq) {
            return Err(CacheError::NotFound {
                key: fq.to_string(),
                recovery_hint: RecoveryHint::Ignore,
            });
        }

        self.write_value(fq, value, ttl_secs)
    }

    /// Encode `value` and write it with an expiry `ttl_secs` from now
    pub(super) fn write_value<T>(
        &self,
        fq: &FullyQualifiedKey,
        value: &T,
        ttl_secs: u64,
    ) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let store = self.store()?;
        let entry = Entry::encode(value, expiration(ttl_secs, self.now()))?;
        store.write(fq, entry)
    }
}
