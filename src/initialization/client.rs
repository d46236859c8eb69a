//! HTTP client initialization.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::ClientConfig;
use crate::error_handling::InitializationError;

/// Initializes the HTTP client used by the dispatcher.
///
/// Each attempt is bounded by `timeout_seconds`; a timed-out attempt surfaces
/// as a transport failure and goes through the transport retry path.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client(config: &ClientConfig) -> Result<Arc<reqwest::Client>, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(concat!("window_gate/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(Arc::new(client))
}
