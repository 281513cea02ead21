//! Core cache types and structures

use crate::clock::Clock;
use crate::config::CacheConfig;
use crate::host::WriteSuspension;
use crate::keys::KeyNamespacer;
use crate::storage::EntryStore;
use std::sync::Arc;

use super::stats::StatsCounter;

/// Persistent, namespaced object cache
///
/// Cloning yields another handle to the same engine. There is no
/// process-wide instance; construct one and pass it where it is needed.
#[derive(Clone)]
pub struct ObjectCache {
    pub(super) inner: Arc<CacheInner>,
}

pub(super) struct CacheInner {
    pub config: CacheConfig,
    /// `None` when the storage directory was unusable at startup
    pub store: Option<EntryStore>,
    pub namespacer: KeyNamespacer,
    pub stats: StatsCounter,
    pub clock: Arc<dyn Clock>,
    pub suspension: Arc<dyn WriteSuspension>,
}

impl std::fmt::Debug for ObjectCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectCache")
            .field("base_dir", &self.inner.config.base_dir)
            .field("slug", &self.inner.namespacer.slug())
            .field("tenant", &self.inner.namespacer.current_tenant())
            .field("degraded", &self.inner.store.is_none())
            .finish()
    }
}

/// Result of a read: either the stored value or a miss
///
/// A stored `false`, `0` or `null` is a `Hit`; only an absent, expired or
/// unreadable entry is a `Miss`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Hit(T),
    Miss,
}

impl<T> Lookup<T> {
    pub fn found(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Hit(value) => Some(value),
            Self::Miss => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Hit(value) => Some(value),
            Self::Miss => None,
        }
    }

    /// `(value, found)` pair
    pub fn into_parts(self) -> (Option<T>, bool) {
        let found = self.found();
        (self.into_value(), found)
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Hit(v),
            None => Self::Miss,
        }
    }
}
