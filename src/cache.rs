//! View cache: typed, error-absorbing layer over a [`CacheBackend`].
//!
//! Holds pre-computed result sets for each [`View`], encoded with the
//! versioned envelope from [`crate::serialization`].
//!
//! # Degradation contract
//!
//! Cache operations never fail the overall request. A backend error turns
//! `get` into a MISS and `put`/`invalidate` into logged no-ops, degrading
//! the system to "always hits the Store" instead of breaking it. Undecodable
//! entries (corruption, schema version change) are evicted and reported as
//! MISS so the next read repopulates them.

use crate::backend::CacheBackend;
use crate::model::Item;
use crate::observability::{CacheMetrics, NoOpMetrics};
use crate::serialization;
use crate::view::{View, DEFAULT_TTL};
use std::time::{Duration, Instant};

/// Key-value cache of pre-computed view result sets.
///
/// # Example
///
/// ```
/// use crud_kit::backend::InMemoryBackend;
/// use crud_kit::cache::ViewCache;
/// use crud_kit::view::View;
///
/// # #[tokio::main]
/// # async fn main() {
/// let cache = ViewCache::new(InMemoryBackend::new());
///
/// assert!(cache.get(View::All).await.is_none());
/// cache.put(View::All, &[]).await;
/// assert_eq!(cache.get(View::All).await, Some(vec![]));
/// # }
/// ```
pub struct ViewCache<B: CacheBackend> {
    backend: B,
    ttl: Duration,
    metrics: Box<dyn CacheMetrics>,
}

impl<B: CacheBackend> ViewCache<B> {
    /// Create a view cache with the fixed 300-second TTL.
    pub fn new(backend: B) -> Self {
        ViewCache {
            backend,
            ttl: DEFAULT_TTL,
            metrics: Box::new(NoOpMetrics),
        }
    }

    /// Override the entry TTL. Intended for tests; production uses the
    /// fixed default.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set custom metrics handler.
    pub fn with_metrics(mut self, metrics: Box<dyn CacheMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Fetch the cached result set for a view.
    ///
    /// Returns `None` on absence, expiry, backend failure or an entry that
    /// fails envelope validation. A MISS is never an error.
    pub async fn get(&self, view: View) -> Option<Vec<Item>> {
        let key = view.cache_key();
        let start = Instant::now();

        let bytes = match self.backend.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                self.metrics.record_miss(key, start.elapsed());
                return None;
            }
            Err(e) => {
                warn!("View cache GET {} degraded to MISS: {}", key, e);
                self.metrics.record_degraded(key, &e.to_string());
                return None;
            }
        };

        match serialization::deserialize_from_cache::<Vec<Item>>(&bytes) {
            Ok(items) => {
                self.metrics.record_hit(key, start.elapsed());
                Some(items)
            }
            Err(e) => {
                // Evict so the entry is recomputed rather than re-read.
                warn!("Evicting undecodable cache entry {}: {}", key, e);
                self.metrics.record_degraded(key, &e.to_string());
                let _ = self.backend.delete(key).await;
                None
            }
        }
    }

    /// Store a result set for a view, overwriting any existing entry with a
    /// fresh TTL. Best-effort: failures are logged and swallowed.
    pub async fn put(&self, view: View, items: &[Item]) {
        let key = view.cache_key();
        let start = Instant::now();

        let bytes = match serialization::serialize_for_cache(&items) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.metrics.record_degraded(key, &e.to_string());
                return;
            }
        };

        match self.backend.set(key, bytes, self.ttl).await {
            Ok(()) => self.metrics.record_set(key, start.elapsed()),
            Err(e) => {
                warn!("View cache PUT {} dropped: {}", key, e);
                self.metrics.record_degraded(key, &e.to_string());
            }
        }
    }

    /// Remove the entry for a view. Idempotent and best-effort.
    pub async fn invalidate(&self, view: View) {
        let key = view.cache_key();
        let start = Instant::now();

        match self.backend.delete(key).await {
            Ok(()) => self.metrics.record_delete(key, start.elapsed()),
            Err(e) => {
                warn!("View cache INVALIDATE {} failed: {}", key, e);
                self.metrics.record_degraded(key, &e.to_string());
            }
        }
    }

    /// Invalidate every known view key.
    ///
    /// The affected-view set of a write is conservatively "all": the view
    /// set is finite, so exhaustive invalidation is cheap and sidesteps
    /// predicate intersection entirely.
    pub async fn invalidate_all(&self) {
        for view in View::ALL {
            self.invalidate(view).await;
        }
    }

    /// Probe backend reachability. Logged at startup, never fatal.
    pub async fn health_check(&self) -> bool {
        self.backend.health_check().await.unwrap_or(false)
    }
}
