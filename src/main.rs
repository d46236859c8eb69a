//! Main application entry point (CLI binary).
//!
//! A thin wrapper around the `window_gate` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Exit status
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;
use tokio_util::sync::CancellationToken;

use window_gate::config::{Command, Opt};
use window_gate::initialization::init_logger_with;
use window_gate::{
    run_batch_with_cancellation, spawn_ctrl_c_listener, start_server, ClientConfig, ServerConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; RUST_LOG and friends may also come from the shell
    let _ = dotenvy::dotenv();

    let opt = Opt::parse();

    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    let outcome = match opt.command {
        Command::Serve(args) => {
            let config = ServerConfig::from(args);
            start_server(&config).await
        }
        Command::Dispatch(args) => {
            let config = ClientConfig::from(args);
            let cancel = CancellationToken::new();
            spawn_ctrl_c_listener(cancel.clone());
            run_batch_with_cancellation(config, cancel).await.map(|report| {
                for (i, result) in report.results.iter().enumerate() {
                    match result {
                        Ok(body) => println!("[{:>3}] {}", i, body),
                        Err(e) => println!("[{:>3}] error: {}", i, e),
                    }
                }
                println!(
                    "{} succeeded, {} failed in {:.1}s",
                    report.successes,
                    report.failures,
                    report.elapsed.as_secs_f64()
                );
            })
        }
    };

    if let Err(e) = outcome {
        eprintln!("window_gate error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}
