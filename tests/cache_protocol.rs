//! End-to-end exercises of the read-through / write-invalidate protocol
//! against the in-memory store and cache backends.

use crud_kit::backend::{CacheBackend, InMemoryBackend};
use crud_kit::cache::ViewCache;
use crud_kit::error::{Error, Result};
use crud_kit::model::ItemDraft;
use crud_kit::service::{ItemService, Source};
use crud_kit::store::{InMemoryStore, ItemStore};
use crud_kit::view::View;
use std::time::Duration;

fn service() -> ItemService<InMemoryStore, InMemoryBackend> {
    ItemService::new(InMemoryStore::new(), ViewCache::new(InMemoryBackend::new()))
}

#[tokio::test]
async fn create_list_hit_delete_scenario() {
    let service = service();

    let item = service
        .create(ItemDraft::new("EC2", "Compute").valid_service(true))
        .await
        .expect("Failed to create");

    // First list: store answers and populates the cache.
    let first = service.read(View::All).await.expect("Failed to read");
    assert_eq!(first.source, Source::Store);
    assert_eq!(first.items[0].id, item.id);

    // Immediate repeat: identical data, served from cache.
    let second = service.read(View::All).await.expect("Failed to read");
    assert_eq!(second.source, Source::Cache);
    assert_eq!(second.items, first.items);

    // Delete invalidates, so the next list hits the store and the item
    // is gone.
    service.delete(item.id).await.expect("Failed to delete");
    let third = service.read(View::All).await.expect("Failed to read");
    assert_eq!(third.source, Source::Store);
    assert!(third.items.is_empty());
}

#[tokio::test]
async fn valid_only_view_filters_items() {
    let service = service();

    service
        .create(ItemDraft::new("EC2", "Compute").valid_service(true))
        .await
        .expect("Failed to create");
    service
        .create(ItemDraft::new("Altavista", "Search engine"))
        .await
        .expect("Failed to create");

    let valid = service.read(View::ValidOnly).await.expect("Failed to read");
    assert_eq!(valid.items.len(), 1);
    assert_eq!(valid.items[0].name, "EC2");

    let all = service.read(View::All).await.expect("Failed to read");
    assert_eq!(all.items.len(), 2);
}

#[tokio::test]
async fn read_after_write_never_predates_the_write() {
    let service = service();

    // Interleave writes and reads; after each write the very next read
    // must observe it.
    for i in 0..5 {
        let name = format!("service-{}", i);
        let created = service
            .create(ItemDraft::new(name.clone(), "generated"))
            .await
            .expect("Failed to create");

        let outcome = service.read(View::All).await.expect("Failed to read");
        assert_eq!(outcome.source, Source::Store);
        assert_eq!(outcome.items[0].id, created.id);
        assert_eq!(outcome.items[0].name, name);

        // Warm the cache again before the next write.
        let cached = service.read(View::All).await.expect("Failed to read");
        assert_eq!(cached.source, Source::Cache);
    }
}

#[tokio::test]
async fn newest_first_ordering_survives_caching() {
    let service = service();

    for name in ["EC2", "S3", "RDS"] {
        service
            .create(ItemDraft::new(name, "aws").valid_service(true))
            .await
            .expect("Failed to create");
    }

    let from_store = service.read(View::All).await.expect("Failed to read");
    let from_cache = service.read(View::All).await.expect("Failed to read");

    let names: Vec<&str> = from_cache.items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["RDS", "S3", "EC2"]);
    assert_eq!(from_store.items, from_cache.items);
}

#[tokio::test]
async fn expired_entry_falls_back_to_store() {
    let cache = ViewCache::new(InMemoryBackend::new()).with_ttl(Duration::from_millis(100));
    let service = ItemService::new(InMemoryStore::new(), cache);

    service
        .create(ItemDraft::new("EC2", "Compute"))
        .await
        .expect("Failed to create");

    service.read(View::All).await.expect("Failed to read");
    let hit = service.read(View::All).await.expect("Failed to read");
    assert_eq!(hit.source, Source::Cache);

    tokio::time::sleep(Duration::from_millis(150)).await;

    let after_expiry = service.read(View::All).await.expect("Failed to read");
    assert_eq!(after_expiry.source, Source::Store);
    assert_eq!(after_expiry.items, hit.items);
}

/// Backend that refuses every operation, standing in for an unreachable
/// Memcached.
#[derive(Clone)]
struct UnreachableBackend;

impl CacheBackend for UnreachableBackend {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Err(Error::BackendError("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<()> {
        Err(Error::BackendError("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Err(Error::BackendError("connection refused".to_string()))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }
}

#[tokio::test]
async fn unreachable_cache_degrades_to_store_reads() {
    let service = ItemService::new(InMemoryStore::new(), ViewCache::new(UnreachableBackend));

    let item = service
        .create(ItemDraft::new("EC2", "Compute"))
        .await
        .expect("Create must succeed with cache down");

    // Every read is correct and comes from the store; no error surfaces.
    for _ in 0..3 {
        let outcome = service.read(View::All).await.expect("Failed to read");
        assert_eq!(outcome.source, Source::Store);
        assert_eq!(outcome.items[0].id, item.id);
    }

    service
        .update(item.id, ItemDraft::new("EC2", "Elastic Compute"))
        .await
        .expect("Update must succeed with cache down");
    service
        .delete(item.id)
        .await
        .expect("Delete must succeed with cache down");
}

#[tokio::test]
async fn concurrent_readers_share_one_cache() {
    let store = InMemoryStore::new();
    let backend = InMemoryBackend::new();

    for i in 0..10 {
        store
            .create(&ItemDraft::new(format!("svc-{}", i), "generated"))
            .await
            .expect("Failed to create");
    }

    // Warm the cache once.
    let warmer = ItemService::new(store.clone(), ViewCache::new(backend.clone()));
    warmer.read(View::All).await.expect("Failed to read");

    let mut handles = vec![];
    for _ in 0..8 {
        let store = store.clone();
        let backend = backend.clone();
        handles.push(tokio::spawn(async move {
            let service = ItemService::new(store, ViewCache::new(backend));
            let outcome = service.read(View::All).await.expect("Failed to read");
            assert_eq!(outcome.source, Source::Cache);
            assert_eq!(outcome.items.len(), 10);
        }));
    }

    for handle in handles {
        handle.await.expect("Task failed");
    }
}
