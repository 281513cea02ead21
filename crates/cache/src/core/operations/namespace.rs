//! Tenant and group management plus read-only accessors

use crate::core::stats::CacheStatistics;
use crate::core::types::ObjectCache;

impl ObjectCache {
    /// Mark `groups` as shared by every tenant
    pub fn add_global_groups<I, S>(&self, groups: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.namespacer.add_global_groups(groups);
    }

    /// Entries are always persistent here; such groups are treated as global.
    pub fn add_non_persistent_groups<I, S>(&self, groups: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_global_groups(groups);
    }

    /// Change the tenant used for keys in non-global groups.
    ///
    /// Ignored (pinned to tenant 1) when multisite is off.
    pub fn switch_tenant(&self, tenant: u64) {
        let effective = self.inner.namespacer.switch_tenant(tenant);
        tracing::debug!(requested = tenant, effective, "switched cache tenant");
    }

    /// Prefix currently applied to non-global groups
    pub fn tenant_prefix(&self) -> u64 {
        self.inner.namespacer.current_tenant()
    }

    pub fn global_groups(&self) -> Vec<String> {
        self.inner.namespacer.global_groups()
    }

    pub fn is_multisite(&self) -> bool {
        self.inner.namespacer.is_multisite()
    }

    pub fn accelerator_enabled(&self) -> bool {
        self.inner
            .store
            .as_ref()
            .map(|store| store.has_accelerator())
            .unwrap_or(false)
    }

    /// True when the storage directory could not be initialized
    pub fn is_degraded(&self) -> bool {
        self.inner.store.is_none()
    }

    pub fn cache_hits(&self) -> u64 {
        self.inner.stats.hits()
    }

    pub fn cache_misses(&self) -> u64 {
        self.inner.stats.misses()
    }

    pub fn statistics(&self) -> CacheStatistics {
        self.inner.stats.snapshot()
    }

    /// The fully-qualified key `key` in `group` maps to right now
    pub fn build_key(&self, key: &str, group: &str) -> String {
        self.inner.namespacer.build_key(key, group).to_string()
    }

    /// Path of the backing file for `key` in `group`, if storage is available
    pub fn entry_path(&self, key: &str, group: &str) -> Option<std::path::PathBuf> {
        let fq = self.inner.namespacer.build_key(key, group);
        self.inner.store.as_ref().map(|store| store.entry_path(&fq))
    }
}
