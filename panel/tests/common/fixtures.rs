//! Test fixtures shared across the integration suite

use std::time::Duration;

use panel::services::SupervisorConfig;

/// Rows the fake worker is assumed to have persisted already,
/// as (captured_at_millis, entries, exits).
pub const SEED_ROWS: [(i64, i64, i64); 3] = [(1_000, 5, 2), (2_000, 6, 3), (3_000, 8, 4)];

/// A row "written by the worker" while the panel is live.
pub const LIVE_ROW: (i64, i64, i64) = (4_000, 9, 5);

/// Launch argv for a harmless long-running fake worker.
pub fn idle_worker() -> Vec<String> {
    vec![
        "/bin/sh".to_string(),
        "-c".to_string(),
        "sleep 30".to_string(),
    ]
}

/// Teardown bounds tight enough to keep the suite fast.
pub fn test_supervisor_config() -> SupervisorConfig {
    SupervisorConfig {
        graceful_timeout: Duration::from_millis(500),
        kill_timeout: Duration::from_secs(2),
    }
}
