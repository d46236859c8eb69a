//! Configuration constants.
//!
//! Defaults for the server and the client. The CLI exposes most of them as
//! flags; the rest are fixed operational parameters.

use std::time::Duration;

// Server defaults
/// Port the rate-limited server listens on
pub const DEFAULT_PORT: u16 = 9000;
/// Admits per client per window
pub const DEFAULT_MAX_REQUESTS: u32 = 10;
/// Fixed window length in seconds
pub const DEFAULT_WINDOW_SIZE_SECS: u64 = 60;
/// Directory served for any path other than `/status`
pub const DEFAULT_STATIC_ROOT: &str = ".";
/// Body returned with a 429 from `/status`
pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Try again later.";

// Client defaults
/// Target endpoint for the dispatcher
pub const DEFAULT_TARGET_URL: &str = "http://127.0.0.1:9000/status";
/// Number of concurrent requests in one batch
pub const DEFAULT_BATCH_SIZE: usize = 15;
/// Local budget: permits per accounting period
pub const DEFAULT_RATE: u32 = 10;
/// Local budget: accounting period in seconds
pub const DEFAULT_PERIOD_SECS: u64 = 60;
/// Per-request HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// Retry strategy
/// Attempt ceiling per request (initial attempt included)
pub const RETRY_MAX_ATTEMPTS: u32 = 5;
/// Length of one backoff unit
pub const RETRY_BACKOFF_UNIT: Duration = Duration::from_secs(1);
/// Multiplier applied to `2^attempts_consumed` on a 429
pub const RETRY_BACKOFF_BASE_UNITS: u64 = 10;
/// Fixed delay, in backoff units, after a transport failure
pub const RETRY_TRANSPORT_DELAY_UNITS: u64 = 5;
/// Upper bound of the jitter added to local-budget waits, as a share of the wait
pub const RETRY_JITTER_RATIO: f64 = 0.3;

// HTTP
/// Header carrying the server's advised wait, in whole seconds
pub const RETRY_AFTER_HEADER: &str = "retry-after";
