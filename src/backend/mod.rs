//! Cache backend implementations.

use crate::error::Result;
use std::time::Duration;

pub mod inmemory;
#[cfg(feature = "memcached")]
pub mod memcached;

pub use inmemory::InMemoryBackend;
#[cfg(feature = "memcached")]
pub use memcached::{MemcachedBackend, MemcachedConfig};

/// Trait for raw byte-level cache backends.
///
/// The backend stores opaque bytes under string keys; `ViewCache` layers the
/// envelope codec and the degradation contract on top. Implementations:
/// InMemory (default), Memcached.
///
/// **IMPORTANT:** All methods take `&self` so concurrent requests can share
/// one backend. Implementations use interior mutability (DashMap, connection
/// pool).
///
/// **ASYNC:** All methods are async and must be awaited.
#[allow(async_fn_in_trait)]
pub trait CacheBackend: Send + Sync + Clone {
    /// Retrieve value from cache by key.
    ///
    /// # Returns
    /// - `Ok(Some(bytes))` - Value found and unexpired
    /// - `Ok(None)` - Cache miss
    ///
    /// # Errors
    /// Returns `Err` if backend error occurs (connection lost, etc.)
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store value in cache, unconditionally overwriting any existing entry
    /// and restarting its TTL.
    ///
    /// # Errors
    /// Returns `Err` if backend error occurs
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;

    /// Remove value from cache. No-op if the key is absent (idempotent).
    ///
    /// # Errors
    /// Returns `Err` if backend error occurs
    async fn delete(&self, key: &str) -> Result<()>;

    /// Health check - verify backend is accessible.
    ///
    /// Used at startup to log (not fail on) an unreachable cache.
    ///
    /// # Errors
    /// Returns `Err` if the probe itself cannot run
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}
