//! Shared utilities for panel integration tests

pub mod fixtures;
pub mod helpers;
