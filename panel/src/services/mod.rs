//! Service implementations
//!
//! This module contains the production implementations behind the panel's
//! trait seams plus the worker supervision machinery. These are the pieces
//! that touch the OS: process spawning, signal delivery, and SQLite reads.

pub mod feed;
pub mod process_tree;
pub mod store;
pub mod supervisor;

#[cfg(test)]
mod tests;

// Re-export all service implementations
pub use feed::MetricsFeed;
pub use store::SqliteMetricsStore;
pub use supervisor::{
    Started, Stopped, SupervisorConfig, SupervisorStatus, WorkerSummary, WorkerSupervisor,
};
