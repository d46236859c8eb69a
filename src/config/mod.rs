//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (defaults, retry strategy, header names)
//! - Library configuration for the server and the client
//! - CLI option types and parsing

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{
    ClientConfig, Command, DispatchArgs, LogFormat, LogLevel, Opt, RetryPolicy, ServeArgs,
    ServerConfig,
};
