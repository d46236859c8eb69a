//! Application initialization and resource setup.
//!
//! Builds the shared resources the binary and library entry points need:
//! the logger, the HTTP client, and the client-side rate budget.

mod client;
mod logger;

use std::sync::Arc;

use crate::budget::RateBudget;
use crate::config::ClientConfig;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;

/// Creates the local rate budget shared by every request of a batch.
pub fn init_budget(config: &ClientConfig) -> Arc<RateBudget> {
    log::debug!(
        "Local budget: {} permit(s) per {:.1}s",
        config.rate,
        config.period.as_secs_f64()
    );
    Arc::new(RateBudget::new(config.rate, config.period))
}
