//! Error types for the CRUD service core.

use std::fmt;

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the service core.
///
/// Store-side failures propagate all the way to the caller. Cache-side
/// failures (`BackendError`, envelope errors) are absorbed by `ViewCache`
/// into degraded behavior and normally never escape a request.
#[derive(Debug, Clone)]
pub enum Error {
    /// Durable storage is unreachable.
    ///
    /// Fatal to the request path: every Store operation fails until the
    /// connection recovers, and the caller must surface a visible error
    /// state.
    ConnectionError(String),

    /// Durable storage rejected or failed an operation.
    ///
    /// Common causes:
    /// - Constraint violation on insert
    /// - Query failure
    /// - Connection dropped mid-operation
    StoreError(String),

    /// Update/delete target does not exist.
    ///
    /// Raised by the service when a mutation affects zero rows. The Store
    /// itself reports rows-affected and leaves the decision to the caller.
    NotFound(i64),

    /// Malformed input, rejected before any Store call.
    ///
    /// Example: empty `name` or `description` on create/update.
    ValidationError(String),

    /// Cache backend error (Memcached connection lost, protocol error).
    ///
    /// Never fatal: `ViewCache` degrades a failing `get` to MISS and a
    /// failing `put`/`invalidate` to a logged no-op.
    BackendError(String),

    /// Serializing a view payload for cache storage failed.
    SerializationError(String),

    /// Cached bytes could not be decoded back into a view payload.
    ///
    /// Treated as a MISS; the entry is repopulated from the Store.
    DeserializationError(String),

    /// Cache entry envelope is corrupted (bad magic header).
    InvalidCacheEntry(String),

    /// Cache entry was written under a different schema version.
    ///
    /// Expected during deployments; the entry is evicted and recomputed.
    VersionMismatch {
        /// Expected schema version (from compiled code)
        expected: u32,
        /// Found schema version (from cached entry)
        found: u32,
    },

    /// Invalid configuration at startup.
    ConfigError(String),

    /// Operation exceeded its deadline.
    Timeout(String),

    /// Generic error with custom message.
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConnectionError(msg) => write!(f, "Connection error: {}", msg),
            Error::StoreError(msg) => write!(f, "Store error: {}", msg),
            Error::NotFound(id) => write!(f, "Item {} not found", id),
            Error::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            Error::InvalidCacheEntry(msg) => write!(f, "Invalid cache entry: {}", msg),
            Error::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Cache version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            Error::ConfigError(msg) => write!(f, "Config error: {}", msg),
            Error::Timeout(msg) => write!(f, "Timeout: {}", msg),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolClosed => {
                Error::ConnectionError(e.to_string())
            }
            sqlx::Error::PoolTimedOut => Error::Timeout(e.to_string()),
            _ => Error::StoreError(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Error::BackendError(e.to_string())
        } else if e.is_syntax() || e.is_data() || e.is_eof() {
            Error::DeserializationError(e.to_string())
        } else {
            Error::SerializationError(e.to_string())
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::BackendError(e.to_string())
    }
}

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::Other(e)
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::Other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ValidationError("name is required".to_string());
        assert_eq!(err.to_string(), "Validation error: name is required");
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::NotFound(42);
        assert_eq!(err.to_string(), "Item 42 not found");
    }

    #[test]
    fn test_error_from_string() {
        let err: Error = "test error".into();
        assert!(matches!(err, Error::Other(_)));
    }

    #[test]
    fn test_sqlx_row_not_found_maps_to_store_error() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, Error::StoreError(_)));
    }
}
