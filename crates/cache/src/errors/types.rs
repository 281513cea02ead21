//! Error types shared by the store and the engine

use std::path::PathBuf;
use std::time::Duration;

/// Result of an internal cache step
pub type Result<T> = std::result::Result<T, CacheError>;

pub use CacheError as Error;

/// Everything that can go wrong below the public API
///
/// Store-level code propagates these; the public [`crate::ObjectCache`]
/// surface folds every variant into a boolean or a not-found lookup.
#[derive(Debug)]
pub enum CacheError {
    /// Filesystem call failed on `path`
    Io {
        path: PathBuf,
        operation: &'static str,
        source: std::io::Error,
        recovery_hint: RecoveryHint,
    },

    /// Record or value could not be encoded or decoded
    Serialization {
        key: String,
        operation: SerializationOp,
        source: Box<dyn std::error::Error + Send + Sync>,
        recovery_hint: RecoveryHint,
    },

    /// A backing record exists but cannot be trusted
    Corruption {
        key: String,
        reason: String,
        recovery_hint: RecoveryHint,
    },

    /// Key absent, or present but expired
    NotFound {
        key: String,
        recovery_hint: RecoveryHint,
    },

    /// `add` on a key that already exists
    AlreadyExists {
        key: String,
        recovery_hint: RecoveryHint,
    },

    /// The host has suspended cache additions
    WritesSuspended {
        key: String,
        recovery_hint: RecoveryHint,
    },

    /// Storage directory unusable; the engine runs degraded
    StoreUnavailable {
        store_type: StoreType,
        reason: String,
        recovery_hint: RecoveryHint,
    },

    /// Rejected configuration or call arguments
    Configuration {
        message: String,
        recovery_hint: RecoveryHint,
    },
}

/// What a caller holding the error can do about it
#[derive(Debug, Clone)]
pub enum RecoveryHint {
    /// Transient; try again later
    Retry { after: Duration },

    /// Drop the entry (or the store) and write again
    ClearAndRetry,

    CheckPermissions { path: PathBuf },

    /// Likely out of space or inodes
    CheckDiskSpace,

    UpdateConfiguration,

    /// Needs a human
    Manual { instructions: String },

    /// Expected outcome, nothing to do
    Ignore,
}

/// Direction of a failed serialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializationOp {
    Encode,
    Decode,
}

/// Which store an unavailability refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreType {
    FileSystem,
    Accelerator,
}
