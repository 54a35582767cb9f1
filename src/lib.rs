//! # crud-kit
//!
//! Cache-through CRUD service core: a read-through / write-invalidate cache
//! protocol over a relational `items` table.
//!
//! ## Protocol
//!
//! - **Reads** probe the [`ViewCache`] first; on a miss they query the
//!   [`ItemStore`](store::ItemStore) and write the result back with a fixed
//!   300-second TTL. Every read reports its `source` (cache or store) and
//!   elapsed wall-clock time.
//! - **Writes** mutate the store, then invalidate *every* known view before
//!   returning. The view set is finite and enumerable, so exhaustive
//!   invalidation replaces predicate-aware invalidation.
//! - **Cache failures never fail a request.** An unreachable backend turns
//!   reads into store queries and invalidations into logged no-ops.
//!
//! The web layer (routing, forms, rendering) lives outside this crate and
//! talks to [`ItemService`] through plain method calls.
//!
//! ## Quick Start
//!
//! ```no_run
//! use crud_kit::{
//!     backend::InMemoryBackend, cache::ViewCache, config::ServiceConfig,
//!     model::ItemDraft, service::ItemService, store::SqlItemStore, view::View,
//! };
//!
//! #[tokio::main]
//! async fn main() -> crud_kit::Result<()> {
//!     let config = ServiceConfig::from_env();
//!     let store = SqlItemStore::connect(&config).await?;
//!     let cache = ViewCache::new(InMemoryBackend::new());
//!     let service = ItemService::new(store, cache);
//!
//!     service.create(ItemDraft::new("EC2", "Compute").valid_service(true)).await?;
//!     let outcome = service.read(View::All).await?;
//!     println!("{} items from {} in {:.2} ms",
//!         outcome.items.len(), outcome.source, outcome.elapsed_ms);
//!     Ok(())
//! }
//! ```
//!
//! With the `memcached` feature enabled, swap `InMemoryBackend` for
//! [`backend::MemcachedBackend`] pointed at `MEMCACHE_HOST`.

#[macro_use]
extern crate log;

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod observability;
pub mod serialization;
pub mod service;
pub mod store;
pub mod view;

// Re-exports for convenience
pub use backend::CacheBackend;
pub use cache::ViewCache;
pub use config::ServiceConfig;
pub use error::{Error, Result};
pub use model::{Item, ItemDraft};
pub use service::{ItemService, ReadOutcome, Source};
pub use store::ItemStore;
pub use view::View;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
