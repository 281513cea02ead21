//! Cache delete operation

use crate::core::types::ObjectCache;

use super::report;

impl ObjectCache {
    /// Remove `key` from `group`. Deleting an absent key succeeds.
    pub fn delete(&self, key: &str, group: &str) -> bool {
        let fq = self.inner.namespacer.build_key(key, group);
        let result = match self.store() {
            Ok(store) => store.invalidate(&fq).map(|removed| {
                tracing::trace!(key = %fq, removed, "deleted cache entry");
            }),
            Err(e) => Err(e),
        };
        report("delete", fq.as_str(), result)
    }
}
