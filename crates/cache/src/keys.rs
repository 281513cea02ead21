//! Tenant and group namespacing for cache keys
//!
//! Every raw key is addressed through a fully-qualified key of the form
//! `slug:prefix:group:key`. The prefix is the current tenant id, except for
//! global groups which always use prefix `0` and are therefore shared by
//! every tenant of the installation.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Prefix used for keys in global groups
pub const GLOBAL_PREFIX: u64 = 0;

/// Tenant used when multi-tenancy is disabled
pub const SINGLE_TENANT: u64 = 1;

/// Group used by callers that do not name one
pub const DEFAULT_GROUP: &str = "default";

/// The components a fully-qualified key is built from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyParts {
    pub slug: String,
    pub prefix: u64,
    pub group: String,
    pub key: String,
}

impl KeyParts {
    pub fn render(&self) -> String {
        format!("{}:{}:{}:{}", self.slug, self.prefix, self.group, self.key)
    }
}

/// A key that addresses exactly one backing entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FullyQualifiedKey {
    rendered: String,
    parts: KeyParts,
}

impl FullyQualifiedKey {
    pub fn from_parts(parts: KeyParts) -> Self {
        Self {
            rendered: parts.render(),
            parts,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    pub fn parts(&self) -> &KeyParts {
        &self.parts
    }
}

impl fmt::Display for FullyQualifiedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

impl AsRef<str> for FullyQualifiedKey {
    fn as_ref(&self) -> &str {
        &self.rendered
    }
}

/// Maps `(tenant, group, raw key)` to fully-qualified keys
///
/// Holds the current tenant and the set of global groups. Both are
/// instance state so separate engines never share them.
#[derive(Debug)]
pub struct KeyNamespacer {
    slug: String,
    multisite: bool,
    tenant: AtomicU64,
    global_groups: RwLock<HashSet<String>>,
}

impl KeyNamespacer {
    pub fn new(slug: impl Into<String>, multisite: bool, tenant: u64) -> Self {
        let tenant = if multisite { tenant } else { SINGLE_TENANT };
        Self {
            slug: slug.into(),
            multisite,
            tenant: AtomicU64::new(tenant),
            global_groups: RwLock::new(HashSet::new()),
        }
    }

    /// Build the key for `group`/`key` under the current tenant
    pub fn build_key(&self, key: &str, group: &str) -> FullyQualifiedKey {
        self.build_key_for(self.current_tenant(), group, key)
    }

    /// Build the key for an explicit tenant
    pub fn build_key_for(&self, tenant: u64, group: &str, key: &str) -> FullyQualifiedKey {
        FullyQualifiedKey::from_parts(KeyParts {
            slug: self.slug.clone(),
            prefix: self.prefix_for(tenant, group),
            group: group.to_string(),
            key: key.to_string(),
        })
    }

    /// Prefix segment a key in `group` gets when built for `tenant`
    pub fn prefix_for(&self, tenant: u64, group: &str) -> u64 {
        if self.is_global(group) {
            GLOBAL_PREFIX
        } else {
            tenant
        }
    }

    /// Merge `groups` into the global group set. Groups are never removed.
    pub fn add_global_groups<I, S>(&self, groups: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = self.global_groups.write();
        for group in groups {
            set.insert(group.into());
        }
    }

    pub fn is_global(&self, group: &str) -> bool {
        self.global_groups.read().contains(group)
    }

    /// Global groups in sorted order
    pub fn global_groups(&self) -> Vec<String> {
        let mut groups: Vec<String> = self.global_groups.read().iter().cloned().collect();
        groups.sort();
        groups
    }

    /// Replace the current tenant, returning the id actually in effect.
    ///
    /// Keys already built and entries already written are unaffected.
    pub fn switch_tenant(&self, tenant: u64) -> u64 {
        let effective = if self.multisite { tenant } else { SINGLE_TENANT };
        self.tenant.store(effective, Ordering::Relaxed);
        effective
    }

    pub fn current_tenant(&self) -> u64 {
        self.tenant.load(Ordering::Relaxed)
    }

    pub fn is_multisite(&self) -> bool {
        self.multisite
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }
}
