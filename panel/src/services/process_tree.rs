//! Process-tree enumeration and signal delivery for worker teardown
//!
//! The counting worker spawns its own sub-processes for capture and display,
//! so killing only the top-level handle leaves grandchildren alive. Teardown
//! therefore walks the full descendant tree and signals children before the
//! parent, so a reaping or respawning parent cannot orphan a grandchild
//! mid-teardown.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use sysinfo::{Pid, ProcessStatus, ProcessesToUpdate, System};
use tokio::time::Instant;

use crate::error::PanelResult;

/// How often the bounded exit wait re-checks the tree.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// All live descendants of `root`, breadth-first (children before
/// grandchildren).
pub fn descendants(root: u32) -> Vec<u32> {
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::All, true);

    let mut by_parent: HashMap<u32, Vec<u32>> = HashMap::new();
    for (pid, process) in system.processes() {
        if let Some(parent) = process.parent() {
            by_parent.entry(parent.as_u32()).or_default().push(pid.as_u32());
        }
    }

    let mut found = Vec::new();
    let mut queue = VecDeque::from([root]);
    while let Some(pid) = queue.pop_front() {
        if let Some(children) = by_parent.get(&pid) {
            for &child in children {
                found.push(child);
                queue.push_back(child);
            }
        }
    }
    found
}

/// The subset of `pids` that is still running.
///
/// Zombies count as exited: they hold no resources beyond the table entry
/// and are reaped by their parent (or init) outside our control.
pub fn still_alive(pids: &[u32]) -> Vec<u32> {
    if pids.is_empty() {
        return Vec::new();
    }
    let mut system = System::new();
    let targets: Vec<Pid> = pids.iter().map(|&p| Pid::from_u32(p)).collect();
    system.refresh_processes(ProcessesToUpdate::Some(&targets), true);

    pids.iter()
        .copied()
        .filter(|&pid| match system.process(Pid::from_u32(pid)) {
            Some(process) => !matches!(process.status(), ProcessStatus::Zombie | ProcessStatus::Dead),
            None => false,
        })
        .collect()
}

/// True if any of the given pids is still running.
pub fn any_alive(pids: &[u32]) -> bool {
    !still_alive(pids).is_empty()
}

/// Request graceful termination. A process that is already gone is success,
/// not an error; any other delivery failure surfaces as `TeardownFailed`.
#[cfg(unix)]
pub fn terminate(pid: u32) -> PanelResult<()> {
    signal(pid, nix::sys::signal::Signal::SIGTERM)
}

/// Forceful termination for processes that ignored the graceful request.
#[cfg(unix)]
pub fn force_kill(pid: u32) -> PanelResult<()> {
    signal(pid, nix::sys::signal::Signal::SIGKILL)
}

#[cfg(unix)]
fn signal(pid: u32, sig: nix::sys::signal::Signal) -> PanelResult<()> {
    use crate::error::PanelError;
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid as NixPid;

    match kill(NixPid::from_raw(pid as i32), sig) {
        Ok(()) => Ok(()),
        // Already exited between enumeration and delivery.
        Err(Errno::ESRCH) => Ok(()),
        Err(errno) => Err(PanelError::teardown(format!(
            "{sig} to pid {pid} failed: {errno}"
        ))),
    }
}

#[cfg(not(unix))]
pub fn terminate(pid: u32) -> PanelResult<()> {
    kill_via_sysinfo(pid)
}

#[cfg(not(unix))]
pub fn force_kill(pid: u32) -> PanelResult<()> {
    kill_via_sysinfo(pid)
}

#[cfg(not(unix))]
fn kill_via_sysinfo(pid: u32) -> PanelResult<()> {
    let target = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[target]), false);
    if let Some(process) = system.process(target) {
        process.kill();
    }
    Ok(())
}

/// Poll until every pid has exited or the bound elapses. Returns the pids
/// that were still alive at the deadline.
pub async fn wait_for_exit(pids: &[u32], bound: Duration) -> Vec<u32> {
    let deadline = Instant::now() + bound;
    let mut remaining: Vec<u32> = pids.to_vec();
    loop {
        remaining = still_alive(&remaining);
        if remaining.is_empty() || Instant::now() >= deadline {
            return remaining;
        }
        tokio::time::sleep(EXIT_POLL_INTERVAL).await;
    }
}
