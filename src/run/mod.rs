//! Batch run entry point.

use std::time::Duration;

use anyhow::{Context, Result};
use log::info;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::app::{print_batch_summary, print_error_statistics, validate_target_url};
use crate::config::ClientConfig;
use crate::dispatch::Dispatcher;
use crate::error_handling::DispatchError;
use crate::initialization::{init_budget, init_client};

/// Outcome of one batch of concurrent requests.
#[derive(Debug)]
pub struct BatchReport {
    /// One result per request, in submission order
    pub results: Vec<Result<Value, DispatchError>>,
    /// Number of requests that produced a JSON body
    pub successes: usize,
    /// Number of requests that ended in an error
    pub failures: usize,
    /// Wall-clock time for the whole batch
    pub elapsed: Duration,
}

/// Sends `config.batch_size` concurrent requests to `config.url`.
///
/// Individual request failures are reported in the returned [`BatchReport`],
/// never as an `Err`.
///
/// # Errors
///
/// Returns an error if the target URL is invalid or the HTTP client cannot be
/// built.
///
/// # Example
///
/// ```no_run
/// use window_gate::{run_batch, ClientConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let report = run_batch(ClientConfig::default()).await?;
/// println!("{} succeeded, {} failed", report.successes, report.failures);
/// # Ok(())
/// # }
/// ```
pub async fn run_batch(config: ClientConfig) -> Result<BatchReport> {
    run_batch_with_cancellation(config, CancellationToken::new()).await
}

/// Like [`run_batch`], but stops retrying once `cancel` fires.
///
/// Requests still waiting when the token is cancelled report
/// `DispatchError::Cancelled` in their slot.
///
/// # Errors
///
/// Same as [`run_batch`].
pub async fn run_batch_with_cancellation(
    config: ClientConfig,
    cancel: CancellationToken,
) -> Result<BatchReport> {
    let url = validate_target_url(&config.url).context("Invalid target URL")?;
    let client = init_client(&config).context("Failed to initialize HTTP client")?;
    let budget = init_budget(&config);

    let dispatcher =
        Dispatcher::new(client, budget, config.retry.clone()).with_cancellation(cancel);

    info!(
        "Dispatching {} request(s) to {} (budget {}/{:.0}s, {} attempt(s) each)",
        config.batch_size,
        url,
        config.rate,
        config.period.as_secs_f64(),
        config.retry.max_attempts
    );

    let start = std::time::Instant::now();
    let results = dispatcher.dispatch_batch(&url, config.batch_size).await;
    let elapsed = start.elapsed();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let failures = results.len() - successes;

    print_error_statistics(dispatcher.stats());
    print_batch_summary(results.len(), successes, failures, elapsed.as_secs_f64());

    Ok(BatchReport {
        results,
        successes,
        failures,
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use httptest::{matchers::*, responders::*, Expectation, Server};

    fn fast_config(url: String, batch_size: usize) -> ClientConfig {
        ClientConfig {
            url,
            batch_size,
            rate: 100,
            retry: RetryPolicy {
                backoff_unit: Duration::from_millis(1),
                ..RetryPolicy::default()
            },
            ..ClientConfig::default()
        }
    }

    #[tokio::test]
    async fn test_run_batch_all_succeed() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/status"))
                .times(6)
                .respond_with(status_code(200).body(r#"{"ok": true}"#)),
        );

        let report = run_batch(fast_config(server.url("/status").to_string(), 6))
            .await
            .expect("batch should run");
        assert_eq!(report.results.len(), 6);
        assert_eq!(report.successes, 6);
        assert_eq!(report.failures, 0);
    }

    #[tokio::test]
    async fn test_run_batch_invalid_url_is_startup_error() {
        let result = run_batch(fast_config("ftp://example.com/".to_string(), 3)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_run_batch_zero_size() {
        let report = run_batch(fast_config("http://127.0.0.1:9/status".to_string(), 0))
            .await
            .expect("empty batch is fine");
        assert!(report.results.is_empty());
        assert_eq!(report.successes + report.failures, 0);
    }

    #[tokio::test]
    async fn test_run_batch_cancelled_reports_per_slot() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let report = run_batch_with_cancellation(
            fast_config("http://127.0.0.1:9/status".to_string(), 3),
            cancel,
        )
        .await
        .expect("batch should run");
        assert_eq!(report.failures, 3);
        assert!(report
            .results
            .iter()
            .all(|r| matches!(r, Err(DispatchError::Cancelled))));
    }
}
