//! Storage layer: record format, entry store, accelerator and key locks

pub mod accelerator;
pub mod backend;
pub mod format;
pub mod lock;

pub use accelerator::{AccelerationBackend, MemoryAccelerator};
pub use backend::{hash_key, EntryStore, Sweep, TEMP_FILE_GRACE};
pub use format::{RecordHeader, StoredRecord, RECORD_MAGIC, RECORD_VERSION};
pub use lock::KeyLock;
