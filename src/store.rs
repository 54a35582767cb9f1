//! Durable item storage.
//!
//! The `ItemStore` trait abstracts the relational table behind the service,
//! decoupling the cache protocol from the concrete database client. Every
//! operation is a synchronous round-trip to storage; the Store never caches
//! locally.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE items (
//!     id BIGINT AUTO_INCREMENT PRIMARY KEY,
//!     name TEXT NOT NULL,
//!     description TEXT NOT NULL,
//!     valid_service BOOLEAN NOT NULL DEFAULT FALSE
//! );
//! ```

use crate::config::ServiceConfig;
use crate::error::Result;
use crate::model::{Item, ItemDraft};
use crate::view::View;
use dashmap::DashMap;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Trait for durable item storage implementations.
///
/// # Design for Testability
///
/// Implement with your database client, or use [`InMemoryStore`] provided in
/// this module for tests.
#[allow(async_fn_in_trait)]
pub trait ItemStore: Send + Sync {
    /// Persist a new item, assigning it a fresh unique id.
    ///
    /// # Errors
    /// Returns `Err` on constraint violation or connection failure
    async fn create(&self, draft: &ItemDraft) -> Result<Item>;

    /// Overwrite the mutable fields of an existing item.
    ///
    /// # Returns
    /// The number of rows affected. Zero means the id did not exist; the
    /// caller decides whether that is a no-op or an error.
    ///
    /// # Errors
    /// Returns `Err` if storage is unavailable or the statement fails
    async fn update(&self, id: i64, draft: &ItemDraft) -> Result<u64>;

    /// Remove an item. Absent ids are a silent success (idempotent).
    ///
    /// # Errors
    /// Returns `Err` if storage is unavailable or the statement fails
    async fn delete(&self, id: i64) -> Result<()>;

    /// Fetch the complete result set for a view, ordered by id descending.
    ///
    /// # Errors
    /// Returns `Err` if storage is unavailable or the query fails
    async fn list(&self, view: View) -> Result<Vec<Item>>;
}

// ============================================================================
// SQL-backed store
// ============================================================================

/// Item store backed by a MySQL `items` table via sqlx.
///
/// The pool is acquired once at process start and injected here; dropping
/// the last clone of the pool closes the connections at shutdown.
#[derive(Clone)]
pub struct SqlItemStore {
    pool: MySqlPool,
}

impl SqlItemStore {
    /// Wrap an existing connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        SqlItemStore { pool }
    }

    /// Connect using environment-style configuration.
    ///
    /// # Errors
    /// Returns `Error::ConnectionError` if the database is unreachable.
    /// This is fatal to the request path; the caller must surface it.
    pub async fn connect(config: &ServiceConfig) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.database_url())
            .await?;

        info!("✓ Item store connected to {}", config.db_host);
        Ok(SqlItemStore { pool })
    }
}

impl ItemStore for SqlItemStore {
    async fn create(&self, draft: &ItemDraft) -> Result<Item> {
        let result =
            sqlx::query("INSERT INTO items (name, description, valid_service) VALUES (?, ?, ?)")
                .bind(&draft.name)
                .bind(&draft.description)
                .bind(draft.valid_service)
                .execute(&self.pool)
                .await?;

        let id = result.last_insert_id() as i64;
        debug!("✓ Store INSERT item {}", id);

        Ok(Item {
            id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            valid_service: draft.valid_service,
        })
    }

    async fn update(&self, id: i64, draft: &ItemDraft) -> Result<u64> {
        let result =
            sqlx::query("UPDATE items SET name = ?, description = ?, valid_service = ? WHERE id = ?")
                .bind(&draft.name)
                .bind(&draft.description)
                .bind(draft.valid_service)
                .bind(id)
                .execute(&self.pool)
                .await?;

        let rows = result.rows_affected();
        debug!("✓ Store UPDATE item {} ({} rows)", id, rows);
        Ok(rows)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!("✓ Store DELETE item {}", id);
        Ok(())
    }

    async fn list(&self, view: View) -> Result<Vec<Item>> {
        let query = match view {
            View::All => {
                "SELECT id, name, description, valid_service FROM items ORDER BY id DESC"
            }
            View::ValidOnly => {
                "SELECT id, name, description, valid_service FROM items \
                 WHERE valid_service = TRUE ORDER BY id DESC"
            }
        };

        let items = sqlx::query_as::<_, Item>(query).fetch_all(&self.pool).await?;
        debug!("✓ Store LIST {} -> {} items", view, items.len());
        Ok(items)
    }
}

// ============================================================================
// In-Memory Test Store
// ============================================================================

/// In-memory item store for testing the cache protocol without a database.
///
/// Assigns ids from a monotonically increasing counter, like the real
/// auto-increment column: deleted ids are never reused, so "newest first"
/// stays well-defined across deletes.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    items: Arc<DashMap<i64, Item>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        InMemoryStore {
            items: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Return the number of stored items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Return true if the store contains no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ItemStore for InMemoryStore {
    async fn create(&self, draft: &ItemDraft) -> Result<Item> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let item = Item {
            id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            valid_service: draft.valid_service,
        };
        self.items.insert(id, item.clone());
        Ok(item)
    }

    async fn update(&self, id: i64, draft: &ItemDraft) -> Result<u64> {
        match self.items.get_mut(&id) {
            Some(mut entry) => {
                entry.name = draft.name.clone();
                entry.description = draft.description.clone();
                entry.valid_service = draft.valid_service;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.items.remove(&id);
        Ok(())
    }

    async fn list(&self, view: View) -> Result<Vec<Item>> {
        let mut items: Vec<Item> = self
            .items
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|item| match view {
                View::All => true,
                View::ValidOnly => item.valid_service,
            })
            .collect();

        items.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(items)
    }
}
