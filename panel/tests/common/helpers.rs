//! Test helpers for the integration suite

use std::path::Path;
use std::time::Duration;

use rusqlite::{params, Connection};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use panel::traits::ViewerSink;
use shared::MetricRow;

/// Create the worker-owned counts table and seed it, standing in for the
/// external persistence collaborator.
pub fn create_counts_db(path: &Path, rows: &[(i64, i64, i64)]) {
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

/// Append one row the way the worker would while running.
pub fn append_row(path: &Path, row: (i64, i64, i64)) {
    let conn = Connection::open(path).unwrap();
    conn.execute(
        "INSERT INTO counts (captured_at, entries, exits) VALUES (?1, ?2, ?3)",
        params![row.0, row.1, row.2],
    )
    .unwrap();
}

/// Viewer sink that forwards each delivered window into a channel.
pub struct ChannelSink(UnboundedSender<Vec<MetricRow>>);

impl ChannelSink {
    pub fn new() -> (Self, UnboundedReceiver<Vec<MetricRow>>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (Self(tx), rx)
    }
}

impl ViewerSink for ChannelSink {
    fn on_update(&mut self, rows: Vec<MetricRow>) {
        let _ = self.0.send(rows);
    }
}

/// Wait for a delivery that satisfies the predicate, draining everything
/// else, or panic after the deadline.
pub async fn recv_matching<F>(
    rx: &mut UnboundedReceiver<Vec<MetricRow>>,
    deadline: Duration,
    mut matches: F,
) -> Vec<MetricRow>
where
    F: FnMut(&[MetricRow]) -> bool,
{
    let result = tokio::time::timeout(deadline, async {
        loop {
            let rows = rx.recv().await.expect("feed channel closed");
            if matches(&rows) {
                return rows;
            }
        }
    })
    .await;
    result.expect("no matching delivery before the deadline")
}
