//! File-backed database lifecycle: close, reopen, and re-initialization.

use shelf_index::config::DbConfig;
use shelf_index::{SearchDb, SearchIndex, SearchableItem};
use std::sync::Arc;
use tempfile::TempDir;

fn db_config(tmp: &TempDir) -> DbConfig {
    DbConfig {
        path: tmp.path().join("nested/dir/search.sqlite"),
        max_connections: 5,
    }
}

#[tokio::test]
async fn test_open_creates_parent_dirs_lazily_creates_schema() {
    let tmp = TempDir::new().unwrap();
    let cfg = db_config(&tmp);

    let db = SearchDb::open(&cfg).await.unwrap();
    assert!(cfg.path.exists());
    assert!(!db.schema_initialized());
    assert!(!db.tables_exist().await);

    db.pool().await.unwrap();
    assert!(db.schema_initialized());
    assert!(db.tables_exist().await);
    db.close().await;
}

#[tokio::test]
async fn test_data_survives_close_and_reopen() {
    let tmp = TempDir::new().unwrap();
    let cfg = db_config(&tmp);

    let index = SearchIndex::new(SearchDb::open(&cfg).await.unwrap());
    index
        .rebuild(
            "a",
            "inventory",
            &[SearchableItem::new("a", "inventory", "i1").name("Teak Bench")],
        )
        .await
        .unwrap();
    index.close().await;

    let db = SearchDb::open(&cfg).await.unwrap();
    assert!(!db.schema_initialized());
    let index = SearchIndex::new(db);

    let hits = index.search("a", "inventory", "teak").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert!(index.db().schema_initialized());
    assert!(!index.should_rebuild("a", "inventory").await.unwrap());
    index.close().await;
}

#[tokio::test]
async fn test_closed_handle_reports_missing_tables() {
    let tmp = TempDir::new().unwrap();
    let db = SearchDb::open(&db_config(&tmp)).await.unwrap();
    db.init_schema().await.unwrap();

    let other = db.clone();
    db.close().await;

    assert!(other.check_tables().await.is_err());
    assert!(!other.tables_exist().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_use_creates_schema_once() {
    for round in 0..10 {
        let tmp = TempDir::new().unwrap();
        let index = Arc::new(SearchIndex::new(
            SearchDb::open(&db_config(&tmp)).await.unwrap(),
        ));

        let mut writers = Vec::new();
        for i in 0..5 {
            let index = Arc::clone(&index);
            writers.push(tokio::spawn(async move {
                let item = SearchableItem::new("a", "s", format!("i{}", i)).name("Pine Shelf");
                index.index(&item).await
            }));
        }
        let mut readers = Vec::new();
        for _ in 0..3 {
            let index = Arc::clone(&index);
            readers.push(tokio::spawn(async move {
                index.search("a", "s", "pine").await
            }));
        }

        for w in writers {
            w.await
                .unwrap()
                .unwrap_or_else(|e| panic!("round {}: index failed: {}", round, e));
        }
        for r in readers {
            r.await
                .unwrap()
                .unwrap_or_else(|e| panic!("round {}: search failed: {}", round, e));
        }

        assert_eq!(index.item_ids("a", "s").await.unwrap().len(), 5);
        assert!(index.db().tables_exist().await);
    }
}
