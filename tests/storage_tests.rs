//! Storage backend tests
//!
//! Tests for SeaOrmStorage using temporary SQLite databases.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tempfile::TempDir;

use tinylink::cache::existence_filter::NullExistenceFilter;
use tinylink::cache::object_cache::NullObjectCache;
use tinylink::codec::decode;
use tinylink::config::DatabaseConfig;
use tinylink::errors::TinylinkError;
use tinylink::minter::{IdMinter, TicketMinter};
use tinylink::services::LinkService;
use tinylink::storage::{LinkRecord, LinkStore, SeaOrmStorage};

/// 创建临时 SQLite 数据库的存储实例
async fn create_temp_storage() -> (SeaOrmStorage, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..Default::default()
    };

    let storage = SeaOrmStorage::new(&config, Duration::from_secs(5))
        .await
        .expect("Failed to create storage");

    (storage, temp_dir)
}

async fn collect_ids(storage: &SeaOrmStorage, batch_size: u64) -> Vec<Vec<u64>> {
    storage
        .id_batches(batch_size)
        .map(|batch| batch.expect("batch failed"))
        .collect()
        .await
}

#[tokio::test]
async fn test_insert_and_get() {
    let (storage, _dir) = create_temp_storage().await;
    assert_eq!(storage.backend_name(), "sqlite");

    storage
        .insert(&LinkRecord::new(42, "https://example.com/42"))
        .await
        .unwrap();

    let record = storage.get(42).await.unwrap().expect("record missing");
    assert_eq!(record.id, 42);
    assert_eq!(record.long_url, "https://example.com/42");
}

#[tokio::test]
async fn test_get_missing_is_none() {
    let (storage, _dir) = create_temp_storage().await;
    assert!(storage.get(7).await.unwrap().is_none());
    // 超出 BIGINT 范围的 id 不可能存在
    assert!(storage.get(u64::MAX).await.unwrap().is_none());
}

#[tokio::test]
async fn test_insert_duplicate_id_fails() {
    let (storage, _dir) = create_temp_storage().await;
    let record = LinkRecord::new(5, "https://example.com/a");
    storage.insert(&record).await.unwrap();

    let err = storage
        .insert(&LinkRecord::new(5, "https://example.com/b"))
        .await
        .unwrap_err();
    assert!(matches!(err, TinylinkError::StorageUnavailable(_)));
    // 原记录不被覆盖
    assert_eq!(
        storage.get(5).await.unwrap().unwrap().long_url,
        "https://example.com/a"
    );
}

#[tokio::test]
async fn test_insert_out_of_range_id_rejected() {
    let (storage, _dir) = create_temp_storage().await;
    let err = storage
        .insert(&LinkRecord::new(u64::MAX, "https://example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, TinylinkError::Validation(_)));
}

#[tokio::test]
async fn test_insert_generated_assigns_fresh_ids() {
    let (storage, _dir) = create_temp_storage().await;

    let a = storage.insert_generated("https://example.com/a").await.unwrap();
    let b = storage.insert_generated("https://example.com/b").await.unwrap();
    assert!(b > a);

    assert_eq!(storage.get(a).await.unwrap().unwrap().long_url, "https://example.com/a");
    assert_eq!(storage.get(b).await.unwrap().unwrap().long_url, "https://example.com/b");
}

#[tokio::test]
async fn test_next_ticket_is_monotonic() {
    let (storage, _dir) = create_temp_storage().await;

    let mut last = 0;
    for _ in 0..50 {
        let id = storage.next_ticket().await.unwrap();
        assert!(id > last, "ticket {} not greater than {}", id, last);
        last = id;
    }
}

#[tokio::test]
async fn test_tickets_and_generated_share_sequence() {
    let (storage, _dir) = create_temp_storage().await;

    let ticket = storage.next_ticket().await.unwrap();
    let generated = storage.insert_generated("https://example.com").await.unwrap();
    assert!(generated > ticket);
}

#[tokio::test]
async fn test_ticket_minter_uses_storage() {
    let (storage, _dir) = create_temp_storage().await;
    let storage = Arc::new(storage);
    let minter = TicketMinter::new(storage.clone());

    let first = minter.generate_id().await.unwrap();
    let second = minter.generate_id().await.unwrap();
    assert!(first >= 1);
    assert!(second > first);
}

#[tokio::test]
async fn test_id_batches_ascending_and_complete() {
    let (storage, _dir) = create_temp_storage().await;
    for id in [9u64, 3, 15, 1, 27] {
        storage
            .insert(&LinkRecord::new(id, format!("https://example.com/{}", id)))
            .await
            .unwrap();
    }

    let batches = collect_ids(&storage, 2).await;
    assert_eq!(batches, vec![vec![1, 3], vec![9, 15], vec![27]]);

    let all = collect_ids(&storage, 100).await;
    assert_eq!(all, vec![vec![1, 3, 9, 15, 27]]);
}

#[tokio::test]
async fn test_id_batches_empty_store() {
    let (storage, _dir) = create_temp_storage().await;
    assert!(collect_ids(&storage, 10).await.is_empty());
}

#[tokio::test]
async fn test_reopen_keeps_data() {
    let temp_dir = TempDir::new().unwrap();
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", temp_dir.path().join("re.db").display()),
        ..Default::default()
    };

    let first = SeaOrmStorage::new(&config, Duration::from_secs(5)).await.unwrap();
    let id = first.insert_generated("https://example.com/persist").await.unwrap();
    drop(first);

    let second = SeaOrmStorage::new(&config, Duration::from_secs(5)).await.unwrap();
    assert_eq!(
        second.get(id).await.unwrap().unwrap().long_url,
        "https://example.com/persist"
    );
    // 票号在重启后继续递增
    assert!(second.next_ticket().await.unwrap() > id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_ticket_minting_is_unique() {
    let (storage, _dir) = create_temp_storage().await;
    let minter = Arc::new(TicketMinter::new(Arc::new(storage)));

    let tasks: Vec<_> = (0..1_000)
        .map(|_| {
            let minter = Arc::clone(&minter);
            tokio::spawn(async move { minter.generate_id().await })
        })
        .collect();

    let mut ids = HashSet::new();
    for task in futures_util::future::join_all(tasks).await {
        let id = task.expect("task panicked").expect("minting failed");
        assert!(ids.insert(id), "id {} issued twice", id);
    }
    assert_eq!(ids.len(), 1_000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_creates_store_distinct_links() {
    let (storage, _dir) = create_temp_storage().await;
    let storage = Arc::new(storage);
    let service = Arc::new(LinkService::new(
        Arc::new(TicketMinter::new(storage.clone())),
        storage.clone(),
        Arc::new(NullObjectCache),
        Arc::new(NullExistenceFilter),
    ));

    let tasks: Vec<_> = (0..500)
        .map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                let url = format!("https://example.com/{}", i);
                let code = service.create(&url).await.expect("create failed");
                (code, url)
            })
        })
        .collect();

    let mut codes = HashSet::new();
    for task in futures_util::future::join_all(tasks).await {
        let (code, url) = task.expect("task panicked");
        assert!(codes.insert(code.clone()), "code {} issued twice", code);
        // 每个短码都落到了自己的那一行
        let record = storage.get(decode(&code).unwrap()).await.unwrap().unwrap();
        assert_eq!(record.long_url, url);
    }
    assert_eq!(codes.len(), 500);
    assert_eq!(collect_ids(&storage, 1_000).await.concat().len(), 500);
}
