//! Cache entries: an opaque value plus an absolute expiry

use crate::errors::{CacheError, RecoveryHint, Result, SerializationOp};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Expiry written for a TTL of zero: effectively never.
pub const NO_EXPIRATION: i64 = 9_999_999_999;

/// Absolute expiry for a TTL measured from `now`.
///
/// A TTL of zero means "no expiration", never "already expired".
pub fn expiration(ttl_secs: u64, now: i64) -> i64 {
    if ttl_secs == 0 {
        return NO_EXPIRATION;
    }
    let ttl = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
    now.saturating_add(ttl)
}

/// A stored value and the epoch second after which it is stale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// JSON-encoded payload
    pub value: Vec<u8>,
    pub expires_at: i64,
}

impl Entry {
    pub fn new(value: Vec<u8>, expires_at: i64) -> Self {
        Self { value, expires_at }
    }

    /// Encode `value` and build an entry expiring at `expires_at`
    pub fn encode<T: Serialize + ?Sized>(value: &T, expires_at: i64) -> Result<Self> {
        match serde_json::to_vec(value) {
            Ok(bytes) => Ok(Self::new(bytes, expires_at)),
            Err(e) => Err(CacheError::Serialization {
                key: String::new(),
                operation: SerializationOp::Encode,
                source: Box::new(e),
                recovery_hint: RecoveryHint::Manual {
                    instructions: "Value must be representable as JSON".to_string(),
                },
            }),
        }
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.value).map_err(CacheError::from)
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at < now
    }

    pub fn never_expires(&self) -> bool {
        self.expires_at >= NO_EXPIRATION
    }

    /// Integer view of the stored value, used by `incr`/`decr`.
    ///
    /// Numbers truncate toward zero, numeric strings parse their leading
    /// integer, booleans map to 0/1, null and non-numeric strings map to 0,
    /// and containers map to 0 when empty and 1 otherwise.
    pub fn coerce_integer(&self) -> i64 {
        match serde_json::from_slice::<serde_json::Value>(&self.value) {
            Ok(value) => coerce_value(&value),
            Err(_) => 0,
        }
    }
}

fn coerce_value(value: &serde_json::Value) -> i64 {
    use serde_json::Value;

    match value {
        Value::Null => 0,
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => match n.as_u64() {
                Some(u) => i64::try_from(u).unwrap_or(i64::MAX),
                None => n.as_f64().map(|f| f as i64).unwrap_or(0),
            },
        },
        Value::String(s) => leading_integer(s),
        Value::Array(items) => i64::from(!items.is_empty()),
        Value::Object(map) => i64::from(!map.is_empty()),
    }
}

fn leading_integer(s: &str) -> i64 {
    let trimmed = s.trim_start();
    let mut end = 0;
    for (idx, ch) in trimmed.char_indices() {
        if ch.is_ascii_digit() || (idx == 0 && (ch == '-' || ch == '+')) {
            end = idx + ch.len_utf8();
        } else {
            break;
        }
    }
    let digits = &trimmed[..end];
    match digits.parse::<i64>() {
        Ok(n) => n,
        Err(e) => match e.kind() {
            std::num::IntErrorKind::PosOverflow => i64::MAX,
            std::num::IntErrorKind::NegOverflow => i64::MIN,
            _ => 0,
        },
    }
}
