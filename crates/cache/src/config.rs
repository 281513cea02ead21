//! Cache configuration with builder and environment overlay
//!
//! Precedence, lowest to highest: defaults, environment variables,
//! explicit builder calls made by the host.

use crate::errors::{Error, RecoveryHint, Result};
use crate::keys::SINGLE_TENANT;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default salt prefixed to every entry file name
pub const DEFAULT_KEY_SALT: &str = "opstash";

/// Environment variable names read by [`CacheConfigLoader`]
pub const ENV_CACHE_DIR: &str = "OPSTASH_CACHE_DIR";
pub const ENV_KEY_SALT: &str = "OPSTASH_KEY_SALT";
pub const ENV_SLUG: &str = "OPSTASH_SLUG";
pub const ENV_MULTISITE: &str = "OPSTASH_MULTISITE";
pub const ENV_TENANT_ID: &str = "OPSTASH_TENANT_ID";

/// Configuration for an [`crate::ObjectCache`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding one file per entry
    pub base_dir: PathBuf,
    /// Installation slug, the first segment of every key.
    ///
    /// Defaults to the name of the process's working directory, the way an
    /// installation is named after its root. Processes that share a
    /// `base_dir` but start from different directories therefore see
    /// disjoint namespaces; set `OPSTASH_SLUG` or call
    /// [`CacheConfigBuilder::with_installation_slug`] to share one.
    pub installation_slug: String,
    /// Prefix of every entry file name
    pub key_salt: String,
    /// Whether tenant ids other than 1 are honored
    pub multisite: bool,
    /// Tenant in effect when the cache is created
    pub tenant_id: u64,
    /// TTL in seconds used by `incr`/`decr` rewrites; 0 means no expiration
    pub default_ttl: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            installation_slug: default_slug(),
            key_salt: DEFAULT_KEY_SALT.to_string(),
            multisite: false,
            tenant_id: SINGLE_TENANT,
            default_ttl: 0,
        }
    }
}

impl CacheConfig {
    /// Check values that would produce unusable file names or keys
    pub fn validate(&self) -> Result<()> {
        if self.key_salt.is_empty() {
            return Err(Error::Configuration {
                message: "key salt must not be empty".to_string(),
                recovery_hint: RecoveryHint::UpdateConfiguration,
            });
        }

        for (name, value) in [
            ("key salt", &self.key_salt),
            ("installation slug", &self.installation_slug),
        ] {
            if value.contains('/') || value.contains('\\') {
                return Err(Error::Configuration {
                    message: format!("{name} '{value}' must not contain a path separator"),
                    recovery_hint: RecoveryHint::UpdateConfiguration,
                });
            }
        }

        Ok(())
    }

    /// Tenant id actually used once multisite is taken into account
    pub fn effective_tenant(&self) -> u64 {
        if self.multisite {
            self.tenant_id
        } else {
            SINGLE_TENANT
        }
    }
}

fn default_base_dir() -> PathBuf {
    match dirs::cache_dir() {
        Some(dir) => dir.join("opstash"),
        None => std::env::temp_dir().join("opstash"),
    }
}

/// Basename of the working directory, like an installation root name
fn default_slug() -> String {
    std::env::current_dir()
        .ok()
        .and_then(|dir| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "opstash".to_string())
}

/// Builder for creating cache configurations
#[derive(Debug, Clone, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration, e.g. one from the loader
    pub fn from_config(config: CacheConfig) -> Self {
        Self { config }
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.config.base_dir = base_dir.into();
        self
    }

    pub fn with_installation_slug(mut self, slug: impl Into<String>) -> Self {
        self.config.installation_slug = slug.into();
        self
    }

    pub fn with_key_salt(mut self, salt: impl Into<String>) -> Self {
        self.config.key_salt = salt.into();
        self
    }

    pub fn with_multisite(mut self, multisite: bool) -> Self {
        self.config.multisite = multisite;
        self
    }

    pub fn with_tenant_id(mut self, tenant_id: u64) -> Self {
        self.config.tenant_id = tenant_id;
        self
    }

    pub fn with_default_ttl(mut self, ttl_secs: u64) -> Self {
        self.config.default_ttl = ttl_secs;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CacheConfig {
        self.config
    }
}

/// Loads configuration from defaults and the environment
pub struct CacheConfigLoader;

impl CacheConfigLoader {
    /// Defaults overlaid with `OPSTASH_*` environment variables
    pub fn load() -> Result<CacheConfig> {
        Self::load_from(|name| std::env::var(name).ok())
    }

    /// Like [`load`](Self::load) with an explicit variable source
    pub fn load_from<F>(lookup: F) -> Result<CacheConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = CacheConfig::default();

        if let Some(dir) = lookup(ENV_CACHE_DIR) {
            config.base_dir = PathBuf::from(dir);
        }

        if let Some(salt) = lookup(ENV_KEY_SALT) {
            config.key_salt = salt;
        }

        if let Some(slug) = lookup(ENV_SLUG) {
            config.installation_slug = slug;
        }

        if let Some(multisite) = lookup(ENV_MULTISITE) {
            config.multisite = match multisite.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                other => {
                    return Err(Error::Configuration {
                        message: format!("{ENV_MULTISITE} must be a boolean, got '{other}'"),
                        recovery_hint: RecoveryHint::UpdateConfiguration,
                    });
                }
            };
        }

        if let Some(tenant) = lookup(ENV_TENANT_ID) {
            config.tenant_id = match tenant.trim().parse::<u64>() {
                Ok(id) => id,
                Err(e) => {
                    return Err(Error::Configuration {
                        message: format!("{ENV_TENANT_ID} must be an unsigned integer: {e}"),
                        recovery_hint: RecoveryHint::UpdateConfiguration,
                    });
                }
            };
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.key_salt, DEFAULT_KEY_SALT);
        assert!(!config.multisite);
        assert_eq!(config.tenant_id, SINGLE_TENANT);
        assert_eq!(config.default_ttl, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_slug_follows_working_directory() {
        let expected = std::env::current_dir()
            .unwrap()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "opstash".to_string());
        assert_eq!(CacheConfig::default().installation_slug, expected);

        // An explicit slug makes handles agree regardless of where they start
        let shared = CacheConfigLoader::load_from(env(&[(ENV_SLUG, "shared")])).unwrap();
        assert_eq!(shared.installation_slug, "shared");
    }

    #[test]
    fn test_builder_overrides() {
        let config = CacheConfigBuilder::new()
            .with_base_dir("/var/cache/site")
            .with_installation_slug("blog")
            .with_key_salt("salt")
            .with_multisite(true)
            .with_tenant_id(4)
            .with_default_ttl(30)
            .build();

        assert_eq!(config.base_dir, PathBuf::from("/var/cache/site"));
        assert_eq!(config.installation_slug, "blog");
        assert_eq!(config.effective_tenant(), 4);
        assert_eq!(config.default_ttl, 30);
    }

    #[test]
    fn test_single_site_forces_tenant_one() {
        let config = CacheConfigBuilder::new().with_tenant_id(9).build();
        assert_eq!(config.effective_tenant(), SINGLE_TENANT);
    }

    #[test]
    fn test_env_overlay() {
        let config = CacheConfigLoader::load_from(env(&[
            (ENV_CACHE_DIR, "/tmp/opstash-env"),
            (ENV_SLUG, "shop"),
            (ENV_MULTISITE, "true"),
            (ENV_TENANT_ID, "12"),
        ]))
        .unwrap();

        assert_eq!(config.base_dir, PathBuf::from("/tmp/opstash-env"));
        assert_eq!(config.installation_slug, "shop");
        assert!(config.multisite);
        assert_eq!(config.tenant_id, 12);
    }

    #[test]
    fn test_env_rejects_bad_values() {
        assert!(CacheConfigLoader::load_from(env(&[(ENV_TENANT_ID, "abc")])).is_err());
        assert!(CacheConfigLoader::load_from(env(&[(ENV_MULTISITE, "maybe")])).is_err());
        assert!(CacheConfigLoader::load_from(env(&[(ENV_KEY_SALT, "")])).is_err());
        assert!(CacheConfigLoader::load_from(env(&[(ENV_KEY_SALT, "a/b")])).is_err());
    }
}
