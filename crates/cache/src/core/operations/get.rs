//! Cache read operations

use crate::core::types::{Lookup, ObjectCache};
use crate::entry::Entry;
use crate::keys::FullyQualifiedKey;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

impl ObjectCache {
    /// Read `key` from `group`, counting a hit or a miss.
    ///
    /// Missing, expired, corrupt and wrongly-typed entries are all misses.
    pub fn get<T>(&self, key: &str, group: &str) -> Lookup<T>
    where
        T: DeserializeOwned,
    {
        let fq = self.inner.namespacer.build_key(key, group);
        let lookup = match self.read_live(&fq) {
            Some(entry) => match entry.decode::<T>() {
                Ok(value) => Lookup::Hit(value),
                Err(e) => {
                    tracing::debug!(key = %fq, error = %e, "stored value does not match requested type");
                    Lookup::Miss
                }
            },
            None => Lookup::Miss,
        };
        self.record_lookup(lookup.found());
        lookup
    }

    /// Read many keys across groups.
    ///
    /// Every requested group appears in the result; keys that miss are
    /// omitted from their group's mapping.
    pub fn get_multi<T, I, G, K, Keys>(&self, request: I) -> HashMap<String, HashMap<String, T>>
    where
        T: DeserializeOwned,
        I: IntoIterator<Item = (G, Keys)>,
        G: AsRef<str>,
        Keys: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut result: HashMap<String, HashMap<String, T>> = HashMap::new();

        for (group, keys) in request {
            let group = group.as_ref();
            let found = result.entry(group.to_string()).or_default();
            for key in keys {
                let key = key.as_ref();
                if let Lookup::Hit(value) = self.get::<T>(key, group) {
                    found.insert(key.to_string(), value);
                }
            }
        }

        result
    }

    /// Read the live entry for `fq`. Store errors are logged and read as absent.
    pub(super) fn read_live(&self, fq: &FullyQualifiedKey) -> Option<Entry> {
        let outcome = match self.store() {
            Ok(store) => store.read(fq, self.now()),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(entry) => entry,
            Err(e) => {
                if e.is_corruption() {
                    tracing::warn!(key = %fq, error = %e, "unreadable cache entry");
                } else {
                    tracing::debug!(key = %fq, error = %e, "cache read failed");
                }
                None
            }
        }
    }

    pub(super) fn record_lookup(&self, found: bool) {
        if found {
            self.inner.stats.record_hit();
        } else {
            self.inner.stats.record_miss();
        }
    }
}
