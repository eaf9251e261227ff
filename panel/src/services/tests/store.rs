//! Tests for the SQLite read path
//!
//! The worker normally owns the schema; these tests stand in for it with a
//! scratch database file.

use std::path::Path;

use rusqlite::{params, Connection};
use tempfile::TempDir;

use super::common::ts;
use crate::error::PanelError;
use crate::services::store::SqliteMetricsStore;
use crate::traits::MetricsSource;

fn create_counts_db(path: &Path, rows: &[(i64, i64, i64)]) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE counts (
            captured_at INTEGER NOT NULL,
            entries INTEGER NOT NULL,
            exits INTEGER NOT NULL
        )",
    )
    .unwrap();
    for &(captured_at, entries, exits) in rows {
        conn.execute(
            "INSERT INTO counts (captured_at, entries, exits) VALUES (?1, ?2, ?3)",
            params![captured_at, entries, exits],
        )
        .unwrap();
    }
}

/// Rows inserted in capture order come back ascending for the chart.
#[tokio::test]
async fn test_latest_returns_ascending_order() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("counts.db");
    create_counts_db(&db, &[(1_000, 5, 2), (2_000, 6, 3), (3_000, 8, 4)]);

    let store = SqliteMetricsStore::new(&db);
    let rows = store.latest(10).await.unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows.iter().map(|r| r.captured_at).collect::<Vec<_>>(),
        vec![ts(1_000), ts(2_000), ts(3_000)]
    );
    assert_eq!(
        rows.iter().map(|r| (r.entries, r.exits)).collect::<Vec<_>>(),
        vec![(5, 2), (6, 3), (8, 4)]
    );
}

#[tokio::test]
async fn test_latest_honors_window_limit() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("counts.db");
    let rows: Vec<(i64, i64, i64)> = (1..=15).map(|i| (i * 1_000, i, 0)).collect();
    create_counts_db(&db, &rows);

    let store = SqliteMetricsStore::new(&db);
    let window = store.latest(10).await.unwrap();

    // The newest ten, still ascending.
    assert_eq!(window.len(), 10);
    assert_eq!(window.first().unwrap().captured_at, ts(6_000));
    assert_eq!(window.last().unwrap().captured_at, ts(15_000));
}

/// Equal timestamps are tie-broken by insertion order, newest first.
#[tokio::test]
async fn test_latest_tie_break_by_insertion_order() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("counts.db");
    create_counts_db(&db, &[(1_000, 1, 0), (1_000, 2, 0)]);

    let store = SqliteMetricsStore::new(&db);
    let rows = store.latest(1).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].entries, 2);
}

/// An empty store is an empty window, not an error.
#[tokio::test]
async fn test_empty_store_yields_empty_window() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("counts.db");
    create_counts_db(&db, &[]);

    let store = SqliteMetricsStore::new(&db);
    let rows = store.latest(10).await.unwrap();
    assert!(rows.is_empty());
}

/// A database that cannot be opened at all is a per-call error.
#[tokio::test]
async fn test_missing_database_is_store_unavailable() {
    let dir = TempDir::new().unwrap();
    let store = SqliteMetricsStore::new(dir.path().join("does-not-exist.db"));

    let result = store.latest(10).await;
    assert!(matches!(result, Err(PanelError::StoreUnavailable { .. })));
}
