//! SQLite-backed read path over the worker's persisted counts
//!
//! The worker owns the schema and the writes; this side only ever runs one
//! query: "the most recent N rows of (captured_at, entries, exits)". Each
//! call opens its own read-only connection and releases it on every exit
//! path, so feed ticks never share a connection with each other.

use chrono::{TimeZone, Utc};
use rusqlite::{params, Connection, OpenFlags};
use std::path::{Path, PathBuf};

use shared::MetricRow;

use crate::error::{PanelError, PanelResult};
use crate::traits::MetricsSource;

/// Default number of rows served to a feed tick.
pub const DEFAULT_WINDOW: usize = 10;

/// Read-only accessor over the worker's `counts` table
pub struct SqliteMetricsStore {
    path: PathBuf,
}

impl SqliteMetricsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_latest(path: &Path, limit: usize) -> PanelResult<Vec<MetricRow>> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|err| PanelError::store(format!("cannot open {}: {err}", path.display())))?;

        // Newest first, ties broken by insertion order (rowid).
        let mut stmt = conn.prepare(
            "SELECT captured_at, entries, exits FROM counts \
             ORDER BY captured_at DESC, rowid DESC LIMIT ?1",
        )?;
        let mut raw = stmt
            .query_map(params![limit as i64], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        // Charts consume the window in ascending capture order.
        raw.reverse();
        raw.into_iter()
            .map(|(millis, entries, exits)| {
                let captured_at = Utc
                    .timestamp_millis_opt(millis)
                    .single()
                    .ok_or_else(|| {
                        PanelError::store(format!("row carries unrepresentable timestamp {millis}"))
                    })?;
                Ok(MetricRow {
                    captured_at,
                    entries: entries.max(0) as u64,
                    exits: exits.max(0) as u64,
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl MetricsSource for SqliteMetricsStore {
    async fn latest(&self, limit: usize) -> PanelResult<Vec<MetricRow>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::read_latest(&path, limit))
            .await
            .map_err(|err| PanelError::store(format!("store read task failed: {err}")))?
    }
}
