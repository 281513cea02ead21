//! Human-readable error messages

use super::types::CacheError;
use std::fmt;

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io {
                path,
                operation,
                source,
                ..
            } => write!(
                f,
                "{} failed on {}: {}",
                operation,
                path.display(),
                source
            ),
            Self::Serialization {
                key,
                operation,
                source,
                ..
            } => write!(f, "{operation:?} failed for {key}: {source}"),
            Self::Corruption { key, reason, .. } => {
                write!(f, "corrupt cache record for {key}: {reason}")
            }
            Self::NotFound { key, .. } => write!(f, "no cache entry for {key}"),
            Self::AlreadyExists { key, .. } => write!(f, "cache entry for {key} already exists"),
            Self::WritesSuspended { key, .. } => {
                write!(f, "cache additions suspended, not adding {key}")
            }
            Self::StoreUnavailable {
                store_type, reason, ..
            } => write!(f, "{store_type:?} store unavailable: {reason}"),
            Self::Configuration { message, .. } => {
                write!(f, "invalid cache configuration: {message}")
            }
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serialization { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
