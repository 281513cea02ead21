//! Recovery utilities for cache errors

use super::types::{CacheError, RecoveryHint};

impl CacheError {
    /// Get the recovery hint for this error
    #[must_use]
    pub const fn recovery_hint(&self) -> &RecoveryHint {
        match self {
            Self::Io { recovery_hint, .. }
            | Self::Serialization { recovery_hint, .. }
            | Self::Corruption { recovery_hint, .. }
            | Self::NotFound { recovery_hint, .. }
            | Self::AlreadyExists { recovery_hint, .. }
            | Self::WritesSuspended { recovery_hint, .. }
            | Self::StoreUnavailable { recovery_hint, .. }
            | Self::Configuration { recovery_hint, .. } => recovery_hint,
        }
    }

    /// Check if this error is transient and can be retried
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self.recovery_hint(), RecoveryHint::Retry { .. })
    }

    /// Check if this error indicates data corruption
    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        matches!(self, Self::Corruption { .. } | Self::Serialization { .. })
    }

    /// Check if this error is an ordinary cache miss
    #[must_use]
    pub const fn is_miss(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_transient_classification() {
        let err = CacheError::from(std::io::Error::new(
            std::io::ErrorKind::Interrupted,
            "interrupted",
        ));
        assert!(err.is_transient());
        assert!(!err.is_corruption());

        let err = CacheError::Corruption {
            key: "k".to_string(),
            reason: "bad magic".to_string(),
            recovery_hint: RecoveryHint::ClearAndRetry,
        };
        assert!(err.is_corruption());
        assert!(!err.is_transient());
    }

    #[test]
    fn test_miss_classification() {
        let err = CacheError::NotFound {
            key: "k".to_string(),
            recovery_hint: RecoveryHint::Ignore,
        };
        assert!(err.is_miss());
        assert_eq!(err.to_string(), "no cache entry for k");

        let err = CacheError::StoreUnavailable {
            store_type: crate::errors::StoreType::FileSystem,
            reason: "degraded".to_string(),
            recovery_hint: RecoveryHint::Retry {
                after: Duration::from_secs(1),
            },
        };
        assert!(!err.is_miss());
        assert!(err.is_transient());
    }
}
