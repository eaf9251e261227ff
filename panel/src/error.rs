//! Panel-specific error types
//!
//! Every variant is recoverable: supervisor and store errors surface to
//! the caller as result values and never cross the process boundary as a
//! fatal signal.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PanelError {
    #[error("Worker is already running")]
    AlreadyRunning,

    #[error("Worker is not running")]
    NotRunning,

    #[error("Failed to launch worker: {source}")]
    LaunchFailed {
        #[source]
        source: std::io::Error,
    },

    #[error("Worker teardown failed: {message}")]
    TeardownFailed { message: String },

    #[error("Metrics store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Configuration error: {field}")]
    ConfigurationError { field: String },

    #[error("Shared component error")]
    SharedError(#[from] shared::SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PanelError {
    pub fn config(field: impl Into<String>) -> Self {
        PanelError::ConfigurationError { field: field.into() }
    }

    pub fn store(message: impl Into<String>) -> Self {
        PanelError::StoreUnavailable {
            message: message.into(),
        }
    }

    pub fn teardown(message: impl Into<String>) -> Self {
        PanelError::TeardownFailed {
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for PanelError {
    fn from(err: rusqlite::Error) -> Self {
        PanelError::store(err.to_string())
    }
}

pub type PanelResult<T> = Result<T, PanelError>;
