//! Trait definitions with mockall annotations for testing
//!
//! These traits are the seams between the polling engine and its
//! collaborators: the persisted metrics store on one side and viewer
//! sessions on the other. Both are mocked in feed tests.

use crate::error::PanelResult;
use shared::MetricRow;

/// Read-only query capability over the worker's persisted aggregate rows
///
/// The schema belongs to the worker; this side only ever asks for the most
/// recent window of rows.
#[mockall::automock]
#[async_trait::async_trait]
pub trait MetricsSource: Send + Sync {
    /// Return the most recent `limit` rows in ascending capture order.
    ///
    /// An empty store yields an empty vector; a store that cannot be opened
    /// for this call yields `StoreUnavailable`, which is recoverable on the
    /// next call.
    async fn latest(&self, limit: usize) -> PanelResult<Vec<MetricRow>>;
}

/// Delivery contract for one viewer session (table, chart, console)
///
/// `on_update` is called at most once per tick and never concurrently with
/// itself for the same subscription. Viewers must unsubscribe on close to
/// release their timer.
#[mockall::automock]
pub trait ViewerSink: Send {
    fn on_update(&mut self, rows: Vec<MetricRow>);
}
