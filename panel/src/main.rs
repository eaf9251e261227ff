//! Main entry point for the panel binary
//!
//! Headless control surface over the supervisor and the metrics feed: a
//! line-oriented command loop stands in for the start/stop buttons of the
//! original desktop panel, and a console viewer session renders the live
//! window.

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;

use panel::services::{MetricsFeed, SqliteMetricsStore, SupervisorConfig, WorkerSupervisor};
use panel::traits::ViewerSink;
use panel::{PanelError, PanelResult};
use shared::logging;
use shared::{panel_info, panel_warn, Component, MetricRow};

/// Control panel for the person-counting worker
#[derive(Parser)]
#[command(name = "panel")]
#[command(about = "Supervises the person-counting worker and relays its persisted counts to live viewers")]
pub struct Args {
    /// Worker executable to supervise
    #[arg(long, default_value = "people-counter")]
    pub worker: String,

    /// Detection model artifact passed to the worker
    #[arg(long, default_value = "detector/MobileNetSSD_deploy.caffemodel")]
    pub model: String,

    /// Detection config artifact passed to the worker
    #[arg(long, default_value = "detector/MobileNetSSD_deploy.prototxt")]
    pub prototxt: String,

    /// SQLite database the worker writes its counts to
    #[arg(long, default_value = "counts.db")]
    pub db: String,

    /// Console viewer refresh interval in milliseconds
    #[arg(long, default_value = "1000")]
    pub refresh_ms: u64,

    /// Number of rows in the live window
    #[arg(long, default_value = "10")]
    pub window: usize,

    /// Seconds to wait for graceful worker exit before escalating
    #[arg(long, default_value = "3")]
    pub stop_grace: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Viewer session that logs the newest row of each delivered window
struct ConsoleViewer;

impl ViewerSink for ConsoleViewer {
    fn on_update(&mut self, rows: Vec<MetricRow>) {
        if let Some(latest) = rows.last() {
            panel_info!(
                Component::Panel,
                "📊 {} | entries {} | exits {}",
                latest.captured_at.format("%H:%M:%S"),
                latest.entries,
                latest.exits
            );
        }
    }
}

#[tokio::main]
async fn main() -> PanelResult<()> {
    let args = Args::parse();

    logging::init_tracing_with_level(Some(&args.log_level));
    logging::log_startup(Component::Panel, "person-counter control panel");

    if args.refresh_ms == 0 {
        return Err(PanelError::config("refresh-ms must be positive"));
    }

    let supervisor = Arc::new(WorkerSupervisor::new(SupervisorConfig {
        graceful_timeout: Duration::from_secs(args.stop_grace),
        ..SupervisorConfig::default()
    }));
    let store = Arc::new(SqliteMetricsStore::new(&args.db));
    let feed = MetricsFeed::with_window(store, args.window);

    let viewer = feed
        .subscribe(Duration::from_millis(args.refresh_ms), ConsoleViewer)
        .await?;

    let launch_args = vec![
        args.worker.clone(),
        "--model".to_string(),
        args.model.clone(),
        "--prototxt".to_string(),
        args.prototxt.clone(),
    ];

    panel_info!(Component::Panel, "Commands: start | stop | status | quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                logging::log_shutdown(Component::Panel, "Received Ctrl+C signal");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // stdin closed
                    break;
                };
                match line.trim() {
                    "" => {}
                    "start" => match supervisor.start(&launch_args).await {
                        Ok(started) => {
                            panel_info!(Component::Panel, "✅ Worker running (pid {})", started.pid);
                        }
                        Err(err) => panel_warn!(Component::Panel, "{}", err),
                    },
                    "stop" => match supervisor.stop().await {
                        Ok(stopped) => {
                            panel_info!(Component::Panel, "✅ Worker stopped (pid {})", stopped.pid);
                        }
                        Err(err) => panel_warn!(Component::Panel, "{}", err),
                    },
                    "status" => {
                        let status = supervisor.check_worker().await;
                        match status.worker {
                            Some(worker) => panel_info!(
                                Component::Panel,
                                "Worker {}: pid {} since {}",
                                status.state,
                                worker.pid,
                                worker.started_at.format("%H:%M:%S")
                            ),
                            None => panel_info!(Component::Panel, "Worker {}", status.state),
                        }
                    }
                    "quit" | "exit" => break,
                    other => panel_warn!(Component::Panel, "Unknown command: {}", other),
                }
            }
        }
    }

    // Viewers first, then the worker tree: no tick may fire during teardown.
    feed.unsubscribe(viewer).await;
    feed.shutdown().await;
    supervisor.shutdown().await;

    logging::log_shutdown(Component::Panel, "panel closed");
    Ok(())
}
