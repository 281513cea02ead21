//! Cache flush operations
//!
//! Scoped flushes scan the store directory and decode each record; the
//! key parts stored in every record say which installation, tenant prefix
//! and group it belongs to.

use crate::core::types::ObjectCache;
use crate::errors::{CacheError, RecoveryHint, Result};
use crate::keys::GLOBAL_PREFIX;
use std::collections::HashSet;

use super::report;

impl ObjectCache {
    /// Remove every entry in the store, plus orphaned temp files and
    /// unused lock files.
    ///
    /// Entries that cannot be removed are logged and skipped; only an
    /// unreadable store directory makes this report failure.
    pub fn flush(&self) -> bool {
        let result = self.store().and_then(|store| store.clear()).map(|sweep| {
            tracing::info!(
                removed = sweep.removed,
                failed = sweep.failed,
                leftovers = sweep.leftovers,
                "flushed object cache"
            );
        });
        report("flush", "*", result)
    }

    /// Remove this installation's entries in any of `groups`, for every
    /// tenant. Fails if no group is given.
    pub fn flush_group<I, S>(&self, groups: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let groups: HashSet<String> = groups.into_iter().map(Into::into).collect();
        report("flush_group", "*", self.try_flush_group(&groups))
    }

    /// Remove this installation's entries for `tenants`, plus all global
    /// group entries. With no tenants given, flushes the current tenant.
    pub fn flush_site<I>(&self, tenants: I) -> bool
    where
        I: IntoIterator<Item = u64>,
    {
        let mut prefixes: HashSet<u64> = tenants.into_iter().collect();
        if prefixes.is_empty() {
            prefixes.insert(self.inner.namespacer.current_tenant());
        }
        prefixes.insert(GLOBAL_PREFIX);

        let slug = self.inner.namespacer.slug();
        let result = self
            .store()
            .and_then(|store| {
                store.remove_where(|record| {
                    record.key.slug == slug && prefixes.contains(&record.key.prefix)
                })
            })
            .map(|sweep| {
                tracing::info!(
                    removed = sweep.removed,
                    failed = sweep.failed,
                    prefixes = ?prefixes,
                    "flushed tenant entries"
                );
            });
        report("flush_site", "*", result)
    }

    /// Remove this installation's entries that are already past expiry.
    ///
    /// Expiration stays lazy; this only runs when a caller asks for it.
    /// Returns how many entries were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.now();
        let slug = self.inner.namespacer.slug();
        let result = self.store().and_then(|store| {
            store.remove_where(|record| record.key.slug == slug && record.expires_at < now)
        });

        match result {
            Ok(sweep) => {
                tracing::info!(
                    removed = sweep.removed,
                    failed = sweep.failed,
                    "purged expired entries"
                );
                sweep.removed
            }
            Err(e) => {
                tracing::warn!(error = %e, "purging expired entries failed");
                0
            }
        }
    }

    fn try_flush_group(&self, groups: &HashSet<String>) -> Result<()> {
        if groups.is_empty() {
            return Err(CacheError::Configuration {
                message: "flush_group needs at least one group".to_string(),
                recovery_hint: RecoveryHint::Ignore,
            });
        }

        let slug = self.inner.namespacer.slug();
        let sweep = self.store()?.remove_where(|record| {
            record.key.slug == slug && groups.contains(&record.key.group)
        })?;
        tracing::info!(
            removed = sweep.removed,
            failed = sweep.failed,
            groups = ?groups,
            "flushed cache groups"
        );
        Ok(())
    }
}
