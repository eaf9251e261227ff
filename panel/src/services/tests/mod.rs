//! Service-specific tests
//!
//! Supervision tests run against real fake processes (shell scripts), store
//! tests against a scratch SQLite file, and feed tests against a mocked
//! metrics source.

mod store;

// Common test utilities for services
pub mod common {
    use chrono::{DateTime, TimeZone, Utc};
    use std::time::Duration;

    use crate::services::supervisor::SupervisorConfig;
    use crate::traits::ViewerSink;
    use shared::MetricRow;

    /// Wrap a shell script into a worker launch argv.
    pub fn fake_worker(script: &str) -> Vec<String> {
        vec!["/bin/sh".to_string(), "-c".to_string(), script.to_string()]
    }

    /// Teardown bounds tight enough to keep tests fast.
    pub fn fast_teardown_config() -> SupervisorConfig {
        SupervisorConfig {
            graceful_timeout: Duration::from_millis(500),
            kill_timeout: Duration::from_secs(2),
        }
    }

    pub fn ts(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    pub fn sample_rows() -> Vec<MetricRow> {
        vec![
            MetricRow {
                captured_at: ts(1_000),
                entries: 5,
                exits: 2,
            },
            MetricRow {
                captured_at: ts(2_000),
                entries: 6,
                exits: 3,
            },
            MetricRow {
                captured_at: ts(3_000),
                entries: 8,
                exits: 4,
            },
        ]
    }

    /// Viewer sink that forwards every delivered window into a channel.
    pub struct ChannelSink(tokio::sync::mpsc::UnboundedSender<Vec<MetricRow>>);

    impl ChannelSink {
        pub fn new() -> (
            Self,
            tokio::sync::mpsc::UnboundedReceiver<Vec<MetricRow>>,
        ) {
            let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
            (Self(tx), rx)
        }
    }

    impl ViewerSink for ChannelSink {
        fn on_update(&mut self, rows: Vec<MetricRow>) {
            let _ = self.0.send(rows);
        }
    }
}
