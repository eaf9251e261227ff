//! Shared types for the person-counter control panel
//!
//! Contains only the truly shared leaf types: metric rows, supervisor state,
//! subscription handles, and the tracing setup used by every component.
//! Component-internal types (worker handles, feed bookkeeping) are kept in
//! their respective modules.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
