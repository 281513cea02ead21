//! File-backed object cache for opstash
//!
//! This crate provides a persistent key/value object cache with:
//! - One file per entry, written atomically through temp file and rename
//! - Tenant and group namespacing with shared global groups
//! - Lazy TTL expiration and counter operations
//! - An optional in-memory accelerator for existence checks
//!
//! Public operations never return errors. Failures are logged through
//! `tracing` and reported as `false`, `None` or a miss.

pub mod clock;
pub mod config;
pub mod core;
pub mod entry;
pub mod errors;
pub mod host;
pub mod keys;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, CacheConfigBuilder, CacheConfigLoader};
pub use core::{
    CacheStatistics, Lookup, ObjectCache, ObjectCacheBuilder, StatsCounter,
    DEFAULT_EXTENSION_SECS,
};
pub use entry::{Entry, NO_EXPIRATION};
pub use errors::{CacheError, Error, RecoveryHint, Result};
pub use host::{NeverSuspended, WriteSuspension};
pub use keys::{
    FullyQualifiedKey, KeyNamespacer, KeyParts, DEFAULT_GROUP, GLOBAL_PREFIX, SINGLE_TENANT,
};
pub use storage::{AccelerationBackend, EntryStore, KeyLock, MemoryAccelerator};
