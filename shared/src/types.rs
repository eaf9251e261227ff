//! Core shared types and identifiers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::SharedError;

/// Unique identifier for feed subscriptions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, SharedError> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| SharedError::InvalidUuid { input: s.to_string() })
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One persisted aggregate produced by the counting worker.
///
/// Rows are written externally and never mutated on this side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRow {
    pub captured_at: DateTime<Utc>,
    pub entries: u64,
    pub exits: u64,
}

/// Lifecycle state of the supervised worker process
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupervisorState {
    Idle,
    Running,
    Stopping,
}

impl SupervisorState {
    /// Encoding used for the lock-free status snapshot cell.
    pub fn as_u8(self) -> u8 {
        match self {
            SupervisorState::Idle => 0,
            SupervisorState::Running => 1,
            SupervisorState::Stopping => 2,
        }
    }

    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => SupervisorState::Running,
            2 => SupervisorState::Stopping,
            _ => SupervisorState::Idle,
        }
    }
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupervisorState::Idle => write!(f, "idle"),
            SupervisorState::Running => write!(f, "running"),
            SupervisorState::Stopping => write!(f, "stopping"),
        }
    }
}

/// Identifies which component of the panel emitted a log line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    Panel,
    Supervisor,
    Feed,
    Store,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Panel => write!(f, "panel"),
            Component::Supervisor => write!(f, "supervisor"),
            Component::Feed => write!(f, "feed"),
            Component::Store => write!(f, "store"),
        }
    }
}
