mod basic;

use crate::clock::ManualClock;
use crate::config::{CacheConfig, CacheConfigBuilder};
use crate::core::ObjectCache;
use std::sync::Arc;
use tempfile::TempDir;

pub(super) const START: i64 = 1_700_000_000;

pub(super) fn config(temp_dir: &TempDir) -> CacheConfig {
    CacheConfigBuilder::new()
        .with_base_dir(temp_dir.path())
        .with_installation_slug("site")
        .build()
}

pub(super) fn multisite_config(temp_dir: &TempDir, tenant: u64) -> CacheConfig {
    CacheConfigBuilder::from_config(config(temp_dir))
        .with_multisite(true)
        .with_tenant_id(tenant)
        .build()
}

pub(super) fn cache_with_clock(config: CacheConfig) -> (ObjectCache, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(START));
    let cache = ObjectCache::builder(config)
        .with_clock(clock.clone())
        .build();
    (cache, clock)
}
