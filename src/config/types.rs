//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and the library-level configuration for both processes.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::constants::*;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Server configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use window_gate::ServerConfig;
///
/// let config = ServerConfig {
///     port: 8080,
///     max_requests: 100,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on (all interfaces)
    pub port: u16,

    /// Admits per client per window
    pub max_requests: u32,

    /// Fixed window length in seconds
    pub window_size_secs: u64,

    /// Interval between sweeps of stale window counters (`None` disables the sweep)
    pub sweep_interval: Option<Duration>,

    /// Directory served for paths other than `/status`
    pub static_root: PathBuf,
}

impl ServerConfig {
    /// Window length as a `Duration`.
    pub fn window_size(&self) -> Duration {
        Duration::from_secs(self.window_size_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_requests: DEFAULT_MAX_REQUESTS,
            window_size_secs: DEFAULT_WINDOW_SIZE_SECS,
            sweep_interval: Some(Duration::from_secs(DEFAULT_WINDOW_SIZE_SECS)),
            static_root: PathBuf::from(DEFAULT_STATIC_ROOT),
        }
    }
}

/// Retry and backoff parameters for a single request.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempt ceiling per request (initial attempt included)
    pub max_attempts: u32,

    /// Length of one backoff unit
    pub backoff_unit: Duration,

    /// 429 backoff is `2^consumed * backoff_base_units` units, capped by the advised wait
    pub backoff_base_units: u64,

    /// Fixed wait after a transport failure, in units
    pub transport_retry_units: u64,

    /// Jitter added to local-budget waits, as a share of the wait (0.0-1.0)
    pub jitter_ratio: f64,

    /// Wall-clock bound for one request including all of its retries
    pub request_deadline: Option<Duration>,

    /// Treat statuses other than 2xx and 429 as errors instead of parsing the body
    pub strict_status: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: RETRY_MAX_ATTEMPTS,
            backoff_unit: RETRY_BACKOFF_UNIT,
            backoff_base_units: RETRY_BACKOFF_BASE_UNITS,
            transport_retry_units: RETRY_TRANSPORT_DELAY_UNITS,
            jitter_ratio: RETRY_JITTER_RATIO,
            request_deadline: None,
            strict_status: false,
        }
    }
}

/// Client configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use window_gate::ClientConfig;
///
/// let config = ClientConfig {
///     batch_size: 50,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint every request in the batch targets
    pub url: String,

    /// Number of concurrent requests
    pub batch_size: usize,

    /// Local budget: permits per period
    pub rate: u32,

    /// Local budget: accounting period
    pub period: Duration,

    /// Per-request HTTP timeout in seconds
    pub timeout_seconds: u64,

    /// Retry and backoff parameters
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_TARGET_URL.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            rate: DEFAULT_RATE,
            period: Duration::from_secs(DEFAULT_PERIOD_SECS),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
        }
    }
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Start the server with the reference limits
/// window_gate serve
///
/// # Fire 50 concurrent requests at it
/// window_gate dispatch --batch-size 50
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "window_gate",
    about = "Fixed-window rate-limited HTTP server and a retrying client to exercise it."
)]
pub struct Opt {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// What to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the rate-limited HTTP server
    Serve(ServeArgs),
    /// Send a batch of concurrent requests with local throttling and retries
    Dispatch(DispatchArgs),
}

/// Options for `serve`.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Admits per client per window
    #[arg(long, default_value_t = DEFAULT_MAX_REQUESTS)]
    pub max_requests: u32,

    /// Fixed window length in seconds
    #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub window_size: u64,

    /// Seconds between sweeps of stale per-client counters (0 disables).
    ///
    /// Defaults to the window size.
    #[arg(long)]
    pub sweep_interval_secs: Option<u64>,

    /// Directory served for paths other than /status
    #[arg(long, value_parser, default_value = DEFAULT_STATIC_ROOT)]
    pub static_root: PathBuf,
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        let sweep_secs = args.sweep_interval_secs.unwrap_or(args.window_size);
        Self {
            port: args.port,
            max_requests: args.max_requests,
            window_size_secs: args.window_size,
            sweep_interval: (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs)),
            static_root: args.static_root,
        }
    }
}

/// Options for `dispatch`.
#[derive(Debug, Args)]
pub struct DispatchArgs {
    /// Target URL
    #[arg(long, default_value = DEFAULT_TARGET_URL)]
    pub url: String,

    /// Number of concurrent requests
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Local budget: permits per period
    #[arg(long, default_value_t = DEFAULT_RATE, value_parser = clap::value_parser!(u32).range(1..))]
    pub rate: u32,

    /// Local budget: accounting period in seconds
    #[arg(long, default_value_t = DEFAULT_PERIOD_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub period_secs: u64,

    /// Attempt ceiling per request
    #[arg(long, default_value_t = RETRY_MAX_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: u32,

    /// Per-request HTTP timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Wall-clock bound for one request including its retries, in seconds
    #[arg(long)]
    pub request_deadline_secs: Option<u64>,

    /// Treat statuses other than 2xx and 429 as errors
    #[arg(long)]
    pub strict_status: bool,
}

impl From<DispatchArgs> for ClientConfig {
    fn from(args: DispatchArgs) -> Self {
        Self {
            url: args.url,
            batch_size: args.batch_size,
            rate: args.rate,
            period: Duration::from_secs(args.period_secs),
            timeout_seconds: args.timeout_seconds,
            retry: RetryPolicy {
                max_attempts: args.max_attempts,
                request_deadline: args.request_deadline_secs.map(Duration::from_secs),
                strict_status: args.strict_status,
                ..RetryPolicy::default()
            },
        }
    }
}
