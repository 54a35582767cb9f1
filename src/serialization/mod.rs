//! Postcard-based serialization for cached view payloads.
//!
//! Every cached view is stored as a versioned envelope:
//!
//! ```text
//! ┌─────────────────┬─────────────────┬──────────────────────────┐
//! │  magic: [u8; 4] │ version: u32    │  postcard payload        │
//! └─────────────────┴─────────────────┴──────────────────────────┘
//!   "CRDK"                                postcard::to_allocvec(T)
//! ```
//!
//! The envelope lets the cache reject foreign or corrupted bytes and evict
//! entries written by a previous schema version instead of silently
//! misreading them. `ViewCache` maps every rejection to a cache MISS, so the
//! next read repopulates from the Store.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Magic header identifying crud-kit cache entries.
pub const CACHE_MAGIC: [u8; 4] = *b"CRDK";

/// Current schema version of cached payloads.
///
/// Increment on any breaking change to [`crate::model::Item`] (fields added,
/// removed, retyped or reordered). Old entries are then evicted and
/// recomputed on their next read.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Versioned envelope wrapped around every cached payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CacheEnvelope<T> {
    /// Magic header: must be b"CRDK"
    pub magic: [u8; 4],
    /// Schema version: must match CURRENT_SCHEMA_VERSION
    pub version: u32,
    /// The actual cached data
    pub payload: T,
}

impl<T> CacheEnvelope<T> {
    /// Create a new envelope with current magic and version.
    pub fn new(payload: T) -> Self {
        Self {
            magic: CACHE_MAGIC,
            version: CURRENT_SCHEMA_VERSION,
            payload,
        }
    }
}

/// Serialize a payload with envelope for cache storage.
///
/// # Errors
///
/// Returns `Error::SerializationError` if Postcard serialization fails.
pub fn serialize_for_cache<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let envelope = CacheEnvelope::new(value);
    postcard::to_allocvec(&envelope).map_err(|e| {
        log::error!("Cache serialization failed: {}", e);
        Error::SerializationError(e.to_string())
    })
}

/// Deserialize a payload from cache storage with validation.
///
/// Checks the magic header and schema version before decoding the payload.
///
/// # Errors
///
/// - `Error::InvalidCacheEntry`: Invalid magic header
/// - `Error::VersionMismatch`: Schema version mismatch
/// - `Error::DeserializationError`: Corrupted Postcard payload
pub fn deserialize_from_cache<'de, T: Deserialize<'de>>(bytes: &'de [u8]) -> Result<T> {
    let envelope: CacheEnvelope<T> = postcard::from_bytes(bytes).map_err(|e| {
        log::error!("Cache deserialization failed: {}", e);
        Error::DeserializationError(e.to_string())
    })?;

    if envelope.magic != CACHE_MAGIC {
        log::warn!(
            "Invalid cache entry: expected magic {:?}, got {:?}",
            CACHE_MAGIC,
            envelope.magic
        );
        return Err(Error::InvalidCacheEntry(format!(
            "Invalid magic: expected {:?}, got {:?}",
            CACHE_MAGIC, envelope.magic
        )));
    }

    if envelope.version != CURRENT_SCHEMA_VERSION {
        log::warn!(
            "Cache version mismatch: expected {}, got {}",
            CURRENT_SCHEMA_VERSION,
            envelope.version
        );
        return Err(Error::VersionMismatch {
            expected: CURRENT_SCHEMA_VERSION,
            found: envelope.version,
        });
    }

    Ok(envelope.payload)
}
