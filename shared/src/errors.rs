//! Shared error types for the control panel

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },

    #[error("Invalid UUID: {input}")]
    InvalidUuid { input: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
