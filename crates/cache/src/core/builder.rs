//! Cache builder and initialization

use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::host::{NeverSuspended, WriteSuspension};
use crate::keys::KeyNamespacer;
use crate::storage::{AccelerationBackend, EntryStore};
use std::sync::Arc;

use super::stats::StatsCounter;
use super::types::{CacheInner, ObjectCache};

impl ObjectCache {
    /// Create a cache with the system clock and no host collaborators
    pub fn new(config: CacheConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: CacheConfig) -> ObjectCacheBuilder {
        ObjectCacheBuilder::new(config)
    }
}

/// Wires host collaborators into an [`ObjectCache`]
pub struct ObjectCacheBuilder {
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    suspension: Arc<dyn WriteSuspension>,
    accelerator: Option<Arc<dyn AccelerationBackend>>,
}

impl ObjectCacheBuilder {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            suspension: Arc::new(NeverSuspended),
            accelerator: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Source of the host's "suspend cache additions" flag
    pub fn with_write_suspension(mut self, suspension: Arc<dyn WriteSuspension>) -> Self {
        self.suspension = suspension;
        self
    }

    pub fn with_accelerator(mut self, accelerator: Arc<dyn AccelerationBackend>) -> Self {
        self.accelerator = Some(accelerator);
        self
    }

    /// Build the cache.
    ///
    /// Never fails: if the configuration is invalid or the storage
    /// directory is unusable, the cache starts degraded and every
    /// operation misses or reports failure.
    pub fn build(self) -> ObjectCache {
        let store = match self.config.validate() {
            Ok(()) => match EntryStore::open(
                self.config.base_dir.clone(),
                self.config.key_salt.clone(),
                self.accelerator,
            ) {
                Ok(store) => Some(store),
                Err(e) => {
                    tracing::error!(
                        base_dir = %self.config.base_dir.display(),
                        error = %e,
                        "cache storage unavailable, running degraded"
                    );
                    None
                }
            },
            Err(e) => {
                tracing::error!(error = %e, "invalid cache configuration, running degraded");
                None
            }
        };

        let namespacer = KeyNamespacer::new(
            self.config.installation_slug.clone(),
            self.config.multisite,
            self.config.effective_tenant(),
        );

        tracing::debug!(
            base_dir = %self.config.base_dir.display(),
            slug = %self.config.installation_slug,
            multisite = self.config.multisite,
            tenant = namespacer.current_tenant(),
            degraded = store.is_none(),
            "object cache initialized"
        );

        ObjectCache {
            inner: Arc::new(CacheInner {
                config: self.config,
                store,
                namespacer,
                stats: StatsCounter::default(),
                clock: self.clock,
                suspension: self.suspension,
            }),
        }
    }
}
