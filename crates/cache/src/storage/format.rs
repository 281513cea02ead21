//! On-disk record format
//!
//! Each entry file is a fixed-size bincode header followed by a bincode
//! body. The header carries a magic number, a format version and the CRC32C
//! of the body, so a truncated or foreign file is rejected before the body
//! is decoded. Nothing in a record is ever executed.

use crate::entry::Entry;
use crate::errors::{CacheError, RecoveryHint, Result, SerializationOp};
use crate::keys::KeyParts;
use crc32c::crc32c;
use serde::{Deserialize, Serialize};

/// Magic number for entry files: "OPST"
pub const RECORD_MAGIC: u32 = 0x4F50_5354;

/// Current record format version
pub const RECORD_VERSION: u16 = 1;

/// Binary header preceding every record body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordHeader {
    magic: u32,
    version: u16,
    reserved: u16,
    body_len: u64,
    pub body_crc: u32,
}

impl RecordHeader {
    pub fn new(body: &[u8]) -> Self {
        Self {
            magic: RECORD_MAGIC,
            version: RECORD_VERSION,
            reserved: 0,
            body_len: body.len() as u64,
            body_crc: crc32c(body),
        }
    }

    /// Encoded size of a header; identical for every header.
    pub fn encoded_len() -> usize {
        bincode::serialized_size(&Self::new(&[])).unwrap_or(20) as usize
    }

    pub fn validate(&self, key: &str) -> Result<()> {
        if self.magic != RECORD_MAGIC {
            return Err(CacheError::Corruption {
                key: key.to_string(),
                reason: format!(
                    "Invalid magic number: expected {:08x}, got {:08x}",
                    RECORD_MAGIC, self.magic
                ),
                recovery_hint: RecoveryHint::ClearAndRetry,
            });
        }

        if self.version > RECORD_VERSION {
            return Err(CacheError::Corruption {
                key: key.to_string(),
                reason: format!("Unsupported record version: {}", self.version),
                recovery_hint: RecoveryHint::Manual {
                    instructions: "Upgrade opstash to read newer cache records".to_string(),
                },
            });
        }

        Ok(())
    }
}

/// The body of an entry file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Components of the key this record was written under
    pub key: KeyParts,
    pub expires_at: i64,
    pub value: Vec<u8>,
}

impl StoredRecord {
    pub fn new(key: KeyParts, entry: Entry) -> Self {
        Self {
            key,
            expires_at: entry.expires_at,
            value: entry.value,
        }
    }

    pub fn into_entry(self) -> Entry {
        Entry::new(self.value, self.expires_at)
    }
}

/// Serialize a record into header + body bytes
pub fn encode_record(record: &StoredRecord) -> Result<Vec<u8>> {
    let body = match bincode::serialize(record) {
        Ok(b) => b,
        Err(e) => {
            return Err(CacheError::Serialization {
                key: record.key.render(),
                operation: SerializationOp::Encode,
                source: e,
                recovery_hint: RecoveryHint::Manual {
                    instructions: "Check record serialization".to_string(),
                },
            });
        }
    };

    let header_bytes = match bincode::serialize(&RecordHeader::new(&body)) {
        Ok(b) => b,
        Err(e) => {
            return Err(CacheError::Serialization {
                key: record.key.render(),
                operation: SerializationOp::Encode,
                source: e,
                recovery_hint: RecoveryHint::Manual {
                    instructions: "Check header serialization".to_string(),
                },
            });
        }
    };

    let mut output = Vec::with_capacity(header_bytes.len() + body.len());
    output.extend_from_slice(&header_bytes);
    output.extend_from_slice(&body);
    Ok(output)
}

/// Parse and verify header + body bytes. `origin` names the file in errors.
pub fn decode_record(bytes: &[u8], origin: &str) -> Result<StoredRecord> {
    let header_len = RecordHeader::encoded_len();
    if bytes.len() < header_len {
        return Err(CacheError::Corruption {
            key: origin.to_string(),
            reason: format!("File too small for header: {} bytes", bytes.len()),
            recovery_hint: RecoveryHint::ClearAndRetry,
        });
    }

    let header: RecordHeader = match bincode::deserialize(&bytes[..header_len]) {
        Ok(h) => h,
        Err(e) => {
            return Err(CacheError::Serialization {
                key: origin.to_string(),
                operation: SerializationOp::Decode,
                source: e,
                recovery_hint: RecoveryHint::ClearAndRetry,
            });
        }
    };
    header.validate(origin)?;

    let body = &bytes[header_len..];
    if body.len() as u64 != header.body_len {
        return Err(CacheError::Corruption {
            key: origin.to_string(),
            reason: format!(
                "Body length mismatch: expected {}, got {}",
                header.body_len,
                body.len()
            ),
            recovery_hint: RecoveryHint::ClearAndRetry,
        });
    }

    let actual_crc = crc32c(body);
    if actual_crc != header.body_crc {
        return Err(CacheError::Corruption {
            key: origin.to_string(),
            reason: format!(
                "Body CRC mismatch: expected {:08x}, got {:08x}",
                header.body_crc, actual_crc
            ),
            recovery_hint: RecoveryHint::ClearAndRetry,
        });
    }

    match bincode::deserialize(body) {
        Ok(record) => Ok(record),
        Err(e) => Err(CacheError::Serialization {
            key: origin.to_string(),
            operation: SerializationOp::Decode,
            source: e,
            recovery_hint: RecoveryHint::ClearAndRetry,
        }),
    }
}
