//! Worker process supervision
//!
//! Owns at most one external counting process at a time. A single lock
//! serializes `start` and `stop` against each other, so concurrent callers
//! can never race two workers into existence; `status` reads a lock-free
//! atomic snapshot.

use chrono::{DateTime, Utc};
use std::process::Stdio;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex as StdMutex;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

use shared::logging::{log_error, log_shutdown};
use shared::{panel_debug, panel_info, panel_warn, Component, SupervisorState};

use crate::error::{PanelError, PanelResult};
use crate::services::process_tree;

/// Teardown timing policy
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// How long to wait for the tree to exit after SIGTERM before escalating.
    pub graceful_timeout: Duration,
    /// How long to wait for the tree to disappear after SIGKILL.
    pub kill_timeout: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            graceful_timeout: Duration::from_secs(3),
            kill_timeout: Duration::from_secs(2),
        }
    }
}

/// Acknowledgement returned by a successful `start`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Started {
    pub pid: u32,
    pub started_at: DateTime<Utc>,
}

/// Acknowledgement returned by a successful `stop`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stopped {
    pub pid: u32,
}

/// Side-effect-free projection of the live worker handle
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerSummary {
    pub pid: u32,
    pub launch_args: Vec<String>,
    pub started_at: DateTime<Utc>,
}

/// Snapshot returned by `status`
#[derive(Clone, Debug)]
pub struct SupervisorStatus {
    pub state: SupervisorState,
    pub worker: Option<WorkerSummary>,
}

/// Handle for the one managed worker process
struct WorkerHandle {
    child: Child,
    pid: u32,
}

/// Supervisor for the external person-counting worker
///
/// Exactly one instance exists per application session. The handle slot is
/// private; every transition goes through `start`/`stop`/`shutdown`.
pub struct WorkerSupervisor {
    /// Exclusive slot for the managed worker; the mutex is what serializes
    /// state transitions.
    slot: Mutex<Option<WorkerHandle>>,
    /// Snapshot cell read by `status` without taking the transition lock.
    state: AtomicU8,
    summary: StdMutex<Option<WorkerSummary>>,
    config: SupervisorConfig,
}

impl WorkerSupervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        Self {
            slot: Mutex::new(None),
            state: AtomicU8::new(SupervisorState::Idle.as_u8()),
            summary: StdMutex::new(None),
            config,
        }
    }

    /// Launch the worker with the given argv (executable first).
    ///
    /// Returns `AlreadyRunning` while a worker is live or being torn down,
    /// and `LaunchFailed` when the OS-level spawn fails; in both cases the
    /// supervisor stays usable and no state is corrupted.
    pub async fn start(&self, launch_args: &[String]) -> PanelResult<Started> {
        // A held lock means another start or a teardown is in flight; report
        // instead of queueing a second launch behind it.
        let mut slot = match self.slot.try_lock() {
            Ok(slot) => slot,
            Err(_) => return Err(PanelError::AlreadyRunning),
        };

        if slot.is_some() {
            return Err(PanelError::AlreadyRunning);
        }

        let (program, args) = launch_args
            .split_first()
            .ok_or_else(|| PanelError::config("launch_args must name the worker executable"))?;

        let mut cmd = Command::new(program);
        cmd.args(args).stdin(Stdio::null());

        let child = cmd
            .spawn()
            .map_err(|source| PanelError::LaunchFailed { source })?;

        let Some(pid) = child.id() else {
            // Spawned but already reaped; treat like a failed launch.
            return Err(PanelError::LaunchFailed {
                source: std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "worker exited before its pid could be captured",
                ),
            });
        };

        let started_at = Utc::now();
        *slot = Some(WorkerHandle { child, pid });
        self.store_summary(Some(WorkerSummary {
            pid,
            launch_args: launch_args.to_vec(),
            started_at,
        }));
        self.store_state(SupervisorState::Running);

        panel_info!(Component::Supervisor, "🚀 Worker started (pid {})", pid);
        Ok(Started { pid, started_at })
    }

    /// Tear down the worker and its full descendant tree.
    ///
    /// Graceful termination first, then a bounded wait, then SIGKILL for
    /// survivors. On teardown failure the supervisor still forces `Idle`
    /// and drops the handle: a dangling OS process beats a supervisor
    /// permanently wedged in `Stopping`.
    pub async fn stop(&self) -> PanelResult<Stopped> {
        let mut slot = self.slot.lock().await;

        let Some(mut handle) = slot.take() else {
            return Err(PanelError::NotRunning);
        };
        self.store_state(SupervisorState::Stopping);

        let pid = handle.pid;
        let result = self.teardown(&mut handle).await;

        self.store_summary(None);
        self.store_state(SupervisorState::Idle);

        match result {
            Ok(()) => {
                panel_info!(Component::Supervisor, "🛑 Worker stopped (pid {})", pid);
                Ok(Stopped { pid })
            }
            Err(err) => Err(err),
        }
    }

    async fn teardown(&self, handle: &mut WorkerHandle) -> PanelResult<()> {
        let tree = process_tree::descendants(handle.pid);
        panel_debug!(
            Component::Supervisor,
            "Tearing down worker {} with {} descendants",
            handle.pid,
            tree.len()
        );

        let mut failures: Vec<String> = Vec::new();

        // Descendants first, then the worker itself.
        for &pid in &tree {
            if let Err(err) = process_tree::terminate(pid) {
                failures.push(err.to_string());
            }
        }
        if let Err(err) = process_tree::terminate(handle.pid) {
            failures.push(err.to_string());
        }

        // Bounded wait: the root is reaped through its child handle, the
        // descendants are polled directly.
        let grace = self.config.graceful_timeout;
        let (root_exit, mut survivors) = tokio::join!(
            tokio::time::timeout(grace, handle.child.wait()),
            process_tree::wait_for_exit(&tree, grace),
        );
        if root_exit.is_err() {
            survivors.insert(0, handle.pid);
        }

        if !survivors.is_empty() {
            panel_warn!(
                Component::Supervisor,
                "⚠️ {} process(es) ignored graceful termination, escalating",
                survivors.len()
            );
            for &pid in &survivors {
                if let Err(err) = process_tree::force_kill(pid) {
                    failures.push(err.to_string());
                }
            }
            let _ = tokio::time::timeout(self.config.kill_timeout, handle.child.wait()).await;
            process_tree::wait_for_exit(&survivors, self.config.kill_timeout).await;
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(PanelError::teardown(failures.join("; ")))
        }
    }

    /// Side-effect-free state snapshot.
    pub fn status(&self) -> SupervisorStatus {
        let state = SupervisorState::from_u8(self.state.load(Ordering::Acquire));
        let worker = self
            .summary
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        SupervisorStatus { state, worker }
    }

    /// Liveness probe: reaps the worker if it exited on its own and
    /// transitions back to `Idle` so the crash becomes visible to callers.
    pub async fn check_worker(&self) -> SupervisorStatus {
        let mut slot = self.slot.lock().await;
        if let Some(handle) = slot.as_mut() {
            match handle.child.try_wait() {
                Ok(None) => {}
                Ok(Some(exit)) => {
                    panel_warn!(
                        Component::Supervisor,
                        "⚠️ Worker {} exited on its own ({})",
                        handle.pid,
                        exit
                    );
                    *slot = None;
                    self.store_summary(None);
                    self.store_state(SupervisorState::Idle);
                }
                Err(err) => {
                    log_error(Component::Supervisor, "Worker liveness check", &err);
                }
            }
        }
        drop(slot);
        self.status()
    }

    /// Application shutdown hook: force-stop the worker before any other
    /// resource is released so no orphan survives the panel.
    pub async fn shutdown(&self) {
        match self.stop().await {
            Ok(stopped) => {
                log_shutdown(
                    Component::Supervisor,
                    &format!("worker {} stopped", stopped.pid),
                );
            }
            Err(PanelError::NotRunning) => {}
            Err(err) => log_error(Component::Supervisor, "Forced worker teardown", &err),
        }
    }

    fn store_state(&self, state: SupervisorState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }

    fn store_summary(&self, summary: Option<WorkerSummary>) {
        *self
            .summary
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = summary;
    }
}

impl Default for WorkerSupervisor {
    fn default() -> Self {
        Self::new(SupervisorConfig::default())
    }
}
