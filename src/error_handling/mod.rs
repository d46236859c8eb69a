//! Error handling and dispatch statistics.
//!
//! This module provides:
//! - Error type definitions (`DispatchError`, `InitializationError`)
//! - The error/warning/info taxonomy used for batch summaries
//! - Thread-safe statistics tracking
//!
//! Categories:
//! - **Errors**: terminal request failures
//! - **Warnings**: responses accepted as success that a strict client would reject
//! - **Info**: retry events (local waits, 429s, transport retries)

mod stats;
mod types;

// Re-export public API
pub use stats::ProcessingStats;
pub use types::{DispatchError, ErrorType, InfoType, InitializationError, WarningType};
