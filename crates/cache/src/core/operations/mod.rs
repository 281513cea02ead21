//! Cache operations, implemented directly on `ObjectCache`
//!
//! Each public operation computes the fully-qualified key first, then talks
//! to the entry store. Public methods never return errors: failures are
//! logged and reported as `false` or a miss.

mod counter;
mod expiration;
mod flush;
mod get;
mod namespace;
mod put;
mod remove;

pub use expiration::DEFAULT_EXTENSION_SECS;

use crate::errors::{CacheError, RecoveryHint, Result, StoreType};
use crate::storage::EntryStore;
use std::time::Duration;

use super::types::ObjectCache;

impl ObjectCache {
    /// The entry store, or `StoreUnavailable` when running degraded
    pub(super) fn store(&self) -> Result<&EntryStore> {
        match &self.inner.store {
            Some(store) => Ok(store),
            None => Err(CacheError::StoreUnavailable {
                store_type: StoreType::FileSystem,
                reason: format!(
                    "cache directory {} could not be initialized",
                    self.inner.config.base_dir.display()
                ),
                recovery_hint: RecoveryHint::Retry {
                    after: Duration::from_secs(1),
                },
            }),
        }
    }

    pub(super) fn now(&self) -> i64 {
        self.inner.clock.now_epoch_secs()
    }
}

/// Fold an operation result into the boolean the public API reports
pub(super) fn report(operation: &'static str, key: &str, result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            log_failure(operation, key, &e);
            false
        }
    }
}

/// Expected outcomes (miss, already exists, suspended) log at debug,
/// everything else at warn.
pub(super) fn log_failure(operation: &'static str, key: &str, error: &CacheError) {
    match error {
        CacheError::NotFound { .. }
        | CacheError::AlreadyExists { .. }
        | CacheError::WritesSuspended { .. } => {
            tracing::debug!(operation, key, reason = %error, "cache operation declined");
        }
        _ => {
            tracing::warn!(operation, key, error = %error, "cache operation failed");
        }
    }
}
