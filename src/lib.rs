//! window_gate library: fixed-window admission control and a cooperating client
//!
//! Two halves that talk to each other over HTTP:
//!
//! - the server side, an [`AdmissionController`] that admits at most
//!   `max_requests` per client per fixed window, behind an axum server that
//!   answers `GET /status` with `{"ok": true}` or a 429
//! - the client side, a [`Dispatcher`] that paces requests through a local
//!   [`RateBudget`], retries 429s with capped exponential backoff, and fans a
//!   batch out over concurrent tasks
//!
//! # Example
//!
//! ```no_run
//! use window_gate::{run_batch, ClientConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig {
//!     url: "http://127.0.0.1:9000/status".to_string(),
//!     batch_size: 15,
//!     ..Default::default()
//! };
//!
//! let report = run_batch(config).await?;
//! println!("{} succeeded, {} failed in {:?}",
//!          report.successes, report.failures, report.elapsed);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

mod admission;
mod app;
mod budget;
pub mod config;
mod dispatch;
mod error_handling;
pub mod initialization;
mod run;
pub mod server;

// Re-export public API
pub use admission::AdmissionController;
pub use app::{spawn_ctrl_c_listener, validate_target_url};
pub use budget::RateBudget;
pub use config::{ClientConfig, LogFormat, LogLevel, RetryPolicy, ServerConfig};
pub use dispatch::Dispatcher;
pub use error_handling::{
    DispatchError, ErrorType, InfoType, InitializationError, ProcessingStats, WarningType,
};
pub use run::{run_batch, run_batch_with_cancellation, BatchReport};
pub use server::start_server;
