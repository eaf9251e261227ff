//! Control-panel core for an external person-counting worker
//!
//! Supervises one long-running worker process (single-instance start, full
//! process-tree teardown) and serves its persisted entry/exit counts to live
//! viewers through a polling metrics feed.

pub mod error;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use error::{PanelError, PanelResult};
pub use services::{MetricsFeed, SqliteMetricsStore, WorkerSupervisor};
pub use traits::{MetricsSource, ViewerSink};
