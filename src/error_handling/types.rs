//! Error type definitions.
//!
//! This module defines the error enums returned by the library and the
//! error, warning, and info taxonomy used for batch statistics.

use std::time::Duration;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// The configured target URL is unusable.
    #[error("Invalid target URL: {0}")]
    InvalidUrlError(String),
}

/// Terminal failure of a single dispatched request.
///
/// Every variant is confined to the slot of the request that produced it;
/// sibling requests in the same batch are unaffected.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The local budget never granted a permit within the attempt budget.
    #[error("local rate budget exhausted after {attempts} attempts")]
    RateLimitExhausted {
        /// Attempts spent, the final one included
        attempts: u32,
    },

    /// The server kept answering 429 until the attempt budget ran out.
    #[error("rate limited by server (status {status}) after {attempts} attempts")]
    RateLimited {
        /// Status of the last response
        status: u16,
        /// Attempts spent, the final one included
        attempts: u32,
        /// The server's last advised wait, if it sent one
        retry_after: Option<Duration>,
    },

    /// Connection-level failure that persisted through every attempt.
    #[error("transport error: {0}")]
    Transport(#[source] ReqwestError),

    /// The response body was not valid JSON.
    #[error("response body is not valid JSON (status {status}): {source}")]
    InvalidBody {
        /// Status of the response that carried the body
        status: u16,
        /// Parse failure
        #[source]
        source: serde_json::Error,
    },

    /// A status other than 2xx or 429 while strict status handling is enabled.
    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),

    /// The request and its retries did not finish within the configured bound.
    #[error("request did not complete within {0:?}")]
    DeadlineExceeded(Duration),

    /// The dispatch was cancelled before this request finished.
    #[error("request cancelled")]
    Cancelled,

    /// The task driving the request panicked or was aborted.
    #[error("request task failed: {0}")]
    TaskFailed(String),
}

impl DispatchError {
    /// Maps the error onto the statistics taxonomy.
    pub fn error_type(&self) -> ErrorType {
        match self {
            DispatchError::RateLimitExhausted { .. } => ErrorType::RateLimitExhausted,
            DispatchError::RateLimited { .. } => ErrorType::RateLimited,
            DispatchError::Transport(e) if e.is_timeout() => ErrorType::TransportTimeout,
            DispatchError::Transport(e) if e.is_connect() => ErrorType::TransportConnect,
            DispatchError::Transport(_) => ErrorType::TransportOther,
            DispatchError::InvalidBody { .. } => ErrorType::InvalidBody,
            DispatchError::UnexpectedStatus(_) => ErrorType::UnexpectedStatus,
            DispatchError::DeadlineExceeded(_) => ErrorType::DeadlineExceeded,
            DispatchError::Cancelled => ErrorType::Cancelled,
            DispatchError::TaskFailed(_) => ErrorType::TaskFailed,
        }
    }
}

/// Types of terminal errors a dispatched request can end with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    /// Local budget denied every attempt
    RateLimitExhausted,
    /// Server answered 429 on every attempt
    RateLimited,
    // Transport errors
    /// Could not connect
    TransportConnect,
    /// Attempt timed out
    TransportTimeout,
    /// Any other connection-level failure
    TransportOther,
    // Response errors
    /// Body was not JSON
    InvalidBody,
    /// Non-2xx status under strict handling
    UnexpectedStatus,
    // Lifecycle
    /// Request deadline elapsed
    DeadlineExceeded,
    /// Dispatch was cancelled
    Cancelled,
    /// Request task panicked or was aborted
    TaskFailed,
}

/// Types of warnings raised while dispatching.
///
/// Warnings mark responses accepted as successes that a stricter client
/// would reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum WarningType {
    /// A 4xx/5xx other than 429 was returned as a success
    NonSuccessStatusAccepted,
}

/// Types of informational events counted while dispatching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    /// Local budget denied a permit
    LocalBudgetWait,
    /// Server answered 429
    ServerRejected,
    /// Transport failure followed by a retry
    TransportRetried,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    /// Label used in the statistics output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::RateLimitExhausted => "Local rate budget exhausted",
            ErrorType::RateLimited => "Rate limited (429)",
            ErrorType::TransportConnect => "Transport connect error",
            ErrorType::TransportTimeout => "Transport timeout",
            ErrorType::TransportOther => "Transport error",
            ErrorType::InvalidBody => "Invalid JSON body",
            ErrorType::UnexpectedStatus => "Unexpected HTTP status",
            ErrorType::DeadlineExceeded => "Request deadline exceeded",
            ErrorType::Cancelled => "Cancelled",
            ErrorType::TaskFailed => "Task failed",
        }
    }
}

impl WarningType {
    /// Label used in the statistics output.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::NonSuccessStatusAccepted => "Non-success status accepted",
        }
    }
}

impl InfoType {
    /// Label used in the statistics output.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::LocalBudgetWait => "Local budget wait",
            InfoType::ServerRejected => "Server rejection (429)",
            InfoType::TransportRetried => "Transport retry",
        }
    }
}
