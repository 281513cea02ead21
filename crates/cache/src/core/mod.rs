//! The cache engine
//!
//! `ObjectCache` ties together the key namespacer, the entry store and the
//! hit/miss counters. Operations live in `operations/`, one file per
//! concern, all implemented directly on `ObjectCache`.

mod builder;
mod operations;
mod stats;
mod types;

pub use builder::ObjectCacheBuilder;
pub use operations::DEFAULT_EXTENSION_SECS;
pub use stats::{CacheStatistics, StatsCounter};
pub use types::{Lookup, ObjectCache};

#[cfg(test)]
mod tests;
