//! Memcached cache backend implementation.

use super::CacheBackend;
use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use async_memcached::AsciiProtocol;
use deadpool_memcached::{Manager, Pool};
use std::time::Duration;

/// Default Memcached connection pool size.
/// Override with MEMCACHED_POOL_SIZE environment variable
const DEFAULT_POOL_SIZE: u32 = 16;

/// Configuration for Memcached backend.
#[derive(Clone, Debug)]
pub struct MemcachedConfig {
    pub server: String, // e.g., "localhost:11211"
    /// Deadline applied to each cache operation, connection acquisition
    /// included. A hung server degrades to MISS/no-op instead of stalling
    /// the request.
    pub connection_timeout: Duration,
    pub pool_size: u32,
}

impl Default for MemcachedConfig {
    fn default() -> Self {
        MemcachedConfig {
            server: "localhost:11211".to_string(),
            connection_timeout: Duration::from_secs(5),
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

impl From<&ServiceConfig> for MemcachedConfig {
    fn from(config: &ServiceConfig) -> Self {
        MemcachedConfig {
            server: config.memcache_addr(),
            ..Default::default()
        }
    }
}

/// Memcached backend with connection pooling and async operations.
///
/// This is the backend the deployed service runs against; TTLs are enforced
/// server-side by Memcached itself.
///
/// # Example
///
/// ```no_run
/// # use crud_kit::backend::{MemcachedBackend, MemcachedConfig, CacheBackend};
/// # use crud_kit::error::Result;
/// # use std::time::Duration;
/// # async fn example() -> Result<()> {
/// let config = MemcachedConfig {
///     server: "localhost:11211".to_string(),
///     ..Default::default()
/// };
///
/// let backend = MemcachedBackend::new(config).await?;
/// backend.set("items_list", b"payload".to_vec(), Duration::from_secs(300)).await?;
/// let value = backend.get("items_list").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MemcachedBackend {
    pool: Pool,
    op_timeout: Duration,
}

impl MemcachedBackend {
    /// Create new Memcached backend from configuration.
    ///
    /// # Errors
    /// Returns `Err` if connection pool creation fails
    pub async fn new(config: MemcachedConfig) -> Result<Self> {
        let manager = Manager::new(config.server.clone());

        let pool = Pool::builder(manager)
            .max_size(config.pool_size as usize)
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to create connection pool: {}", e)))?;

        info!(
            "✓ Memcached backend initialized with server: {} (pool size: {})",
            config.server, config.pool_size
        );

        Ok(MemcachedBackend {
            pool,
            op_timeout: config.connection_timeout,
        })
    }

    /// Create from server address directly.
    ///
    /// Pool size is determined by:
    /// 1. `MEMCACHED_POOL_SIZE` environment variable (if set)
    /// 2. `DEFAULT_POOL_SIZE` constant (16)
    ///
    /// # Errors
    /// Returns `Err` if connection pool creation fails
    pub async fn from_server(addr: String) -> Result<Self> {
        let pool_size = std::env::var("MEMCACHED_POOL_SIZE")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_POOL_SIZE);

        let config = MemcachedConfig {
            server: addr,
            pool_size,
            ..Default::default()
        };
        Self::new(config).await
    }
}

impl CacheBackend for MemcachedBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let op = async {
            let mut conn = self.pool.get().await.map_err(|e| {
                Error::BackendError(format!("Failed to get Memcached connection: {}", e))
            })?;

            match conn.get(key).await {
                Ok(Some(value)) => {
                    debug!("✓ Memcached GET {} -> HIT", key);
                    Ok(value.data)
                }
                Ok(None) => {
                    debug!("✓ Memcached GET {} -> MISS", key);
                    Ok(None)
                }
                Err(e) => Err(Error::BackendError(format!(
                    "Memcached GET failed for key {}: {}",
                    key, e
                ))),
            }
        };

        match tokio::time::timeout(self.op_timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "Memcached GET timed out for key {} after {:?}",
                key, self.op_timeout
            ))),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let op = async {
            let mut conn = self.pool.get().await.map_err(|e| {
                Error::BackendError(format!("Failed to get Memcached connection: {}", e))
            })?;

            // Values < 2592000 (30 days) are interpreted as seconds from now
            let expiration = ttl.as_secs() as i64;

            // Parameter order: set(key, value, ttl, flags)
            conn.set(key, value.as_slice(), Some(expiration), None)
                .await
                .map_err(|e| {
                    Error::BackendError(format!("Memcached SET failed for key {}: {}", key, e))
                })?;

            debug!("✓ Memcached SET {} (TTL: {:?})", key, ttl);
            Ok(())
        };

        match tokio::time::timeout(self.op_timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "Memcached SET timed out for key {} after {:?}",
                key, self.op_timeout
            ))),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let op = async {
            let mut conn = self.pool.get().await.map_err(|e| {
                Error::BackendError(format!("Failed to get Memcached connection: {}", e))
            })?;

            conn.delete(key).await.map_err(|e| {
                Error::BackendError(format!("Memcached DELETE failed for key {}: {}", key, e))
            })?;

            debug!("✓ Memcached DELETE {}", key);
            Ok(())
        };

        match tokio::time::timeout(self.op_timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "Memcached DELETE timed out for key {} after {:?}",
                key, self.op_timeout
            ))),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        // Try to get a connection and perform a simple operation
        let op = async {
            match self.pool.get().await {
                Ok(mut conn) => conn.get("__health_check__").await.is_ok(),
                Err(_) => false,
            }
        };

        match tokio::time::timeout(self.op_timeout, op).await {
            Ok(healthy) => Ok(healthy),
            Err(_) => Ok(false),
        }
    }
}
