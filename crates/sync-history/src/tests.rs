//! Unit tests for the sync-history crate.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;

use crate::{
    open_history_store, FilesystemHistoryStore, HistoryConfig, HistoryStorage, HistoryStore,
    MemoryHistoryStore, SyncReport,
};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn report(table: &str, sync_time: DateTime<Utc>) -> SyncReport {
    SyncReport {
        sync_time,
        source: "Oracle".to_string(),
        destination: "MySQL".to_string(),
        table_name: table.to_string(),
        records_read: 3,
        records_written: 2,
        records_failed: 1,
        success: true,
        error_message: None,
    }
}

// ============================================================================
// SyncReport Tests
// ============================================================================

#[test]
fn test_report_direction_label() {
    let r = report("products", base_time());
    assert_eq!(r.direction(), "Oracle -> MySQL");
}

#[test]
fn test_report_serialization_skips_missing_error() {
    let r = report("products", base_time());
    let json = serde_json::to_string(&r).unwrap();
    assert!(!json.contains("error_message"));

    let parsed: SyncReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, r);
}

// ============================================================================
// HistoryConfig Tests
// ============================================================================

#[test]
fn test_history_config_default() {
    let config = HistoryConfig::default();
    assert_eq!(config.storage, HistoryStorage::Memory);
    assert_eq!(config.max_entries, Some(crate::DEFAULT_MAX_ENTRIES));
}

#[test]
fn test_history_config_filesystem() {
    let config = HistoryConfig::filesystem("/var/lib/table-sync/history.jsonl");
    assert!(matches!(
        config.storage,
        HistoryStorage::Filesystem { ref path } if path.ends_with("history.jsonl")
    ));
    assert_eq!(config.max_entries, Some(crate::DEFAULT_MAX_ENTRIES));
}

#[test]
fn test_history_config_unbounded() {
    let config = HistoryConfig::unbounded();
    assert_eq!(config.max_entries, None);
}

// ============================================================================
// MemoryHistoryStore Tests
// ============================================================================

#[tokio::test]
async fn test_memory_store_newest_first() {
    let store = MemoryHistoryStore::unbounded();
    let t0 = base_time();

    store.append(report("a", t0)).await.unwrap();
    store.append(report("b", t0 + Duration::seconds(10))).await.unwrap();
    store.append(report("c", t0 + Duration::seconds(5))).await.unwrap();

    let all = store.all().await.unwrap();
    let tables: Vec<_> = all.iter().map(|r| r.table_name.as_str()).collect();
    assert_eq!(tables, vec!["b", "c", "a"]);
}

#[tokio::test]
async fn test_memory_store_ties_keep_latest_append_first() {
    let store = MemoryHistoryStore::unbounded();
    let t0 = base_time();

    store.append(report("first", t0)).await.unwrap();
    store.append(report("second", t0)).await.unwrap();

    let all = store.all().await.unwrap();
    assert_eq!(all[0].table_name, "second");
    assert_eq!(all[1].table_name, "first");
}

#[tokio::test]
async fn test_memory_store_retention_evicts_oldest() {
    let store = MemoryHistoryStore::new(Some(2));
    assert_eq!(store.max_entries(), Some(2));
    let t0 = base_time();

    for (i, table) in ["a", "b", "c"].iter().enumerate() {
        store
            .append(report(table, t0 + Duration::seconds(i as i64)))
            .await
            .unwrap();
    }

    let all = store.all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].table_name, "c");
    assert_eq!(all[1].table_name, "b");
}

#[tokio::test]
async fn test_memory_store_returns_copies() {
    let store = MemoryHistoryStore::unbounded();
    store.append(report("a", base_time())).await.unwrap();

    let mut first = store.all().await.unwrap();
    first[0].table_name = "mutated".to_string();

    let second = store.all().await.unwrap();
    assert_eq!(second[0].table_name, "a");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_memory_store_concurrent_appends() {
    const K: usize = 200;
    let store = Arc::new(MemoryHistoryStore::unbounded());

    let mut handles = Vec::with_capacity(K);
    for i in 0..K {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .append(report(&format!("t{i}"), base_time()))
                .await
                .unwrap();
        }));
    }

    // Read while appends are in flight
    let reader = {
        let store = store.clone();
        tokio::spawn(async move {
            for _ in 0..20 {
                let len = store.all().await.unwrap().len();
                assert!(len <= K);
                tokio::task::yield_now().await;
            }
        })
    };

    for handle in handles {
        handle.await.unwrap();
    }
    reader.await.unwrap();

    assert_eq!(store.all().await.unwrap().len(), K);
}

// ============================================================================
// FilesystemHistoryStore Tests
// ============================================================================

#[tokio::test]
async fn test_filesystem_store_missing_file_is_empty() {
    let tmp = TempDir::new().unwrap();
    let store = FilesystemHistoryStore::new(tmp.path().join("history.jsonl"), None);
    assert!(store.all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_filesystem_store_append_and_read() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("history.jsonl");
    let store = FilesystemHistoryStore::new(&path, None);
    assert_eq!(store.path(), &path);
    let t0 = base_time();

    store.append(report("a", t0)).await.unwrap();
    let mut failed = report("b", t0 + Duration::seconds(1));
    failed.success = false;
    failed.error_message = Some("connection refused".to_string());
    store.append(failed.clone()).await.unwrap();

    assert!(path.exists());
    let all = store.all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0], failed);
    assert_eq!(all[1].table_name, "a");

    // A second store over the same file sees the same history
    let reopened = FilesystemHistoryStore::new(&path, None);
    assert_eq!(reopened.all().await.unwrap(), all);
}

#[tokio::test]
async fn test_filesystem_store_skips_malformed_lines() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("history.jsonl");
    let store = FilesystemHistoryStore::new(&path, None);

    store.append(report("a", base_time())).await.unwrap();
    let mut content = std::fs::read_to_string(&path).unwrap();
    content.push_str("not json\n\n");
    std::fs::write(&path, content).unwrap();
    store.append(report("b", base_time())).await.unwrap();

    let all = store.all().await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_filesystem_store_retention_on_read() {
    let tmp = TempDir::new().unwrap();
    let store = FilesystemHistoryStore::new(tmp.path().join("history.jsonl"), Some(1));
    let t0 = base_time();

    store.append(report("old", t0)).await.unwrap();
    store
        .append(report("new", t0 + Duration::seconds(1)))
        .await
        .unwrap();

    let all = store.all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].table_name, "new");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_filesystem_store_concurrent_appends() {
    const K: usize = 50;
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(FilesystemHistoryStore::new(
        tmp.path().join("history.jsonl"),
        None,
    ));

    let handles: Vec<_> = (0..K)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .append(report(&format!("t{i}"), base_time()))
                    .await
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.all().await.unwrap().len(), K);
}

#[tokio::test]
async fn test_open_history_store_from_config() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("history.jsonl");

    let store = open_history_store(&HistoryConfig::filesystem(&path));
    store.append(report("a", base_time())).await.unwrap();
    assert!(path.exists());

    let memory = open_history_store(&HistoryConfig::default());
    memory.append(report("a", base_time())).await.unwrap();
    assert_eq!(memory.all().await.unwrap().len(), 1);
}
