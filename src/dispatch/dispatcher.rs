//! Resilient request dispatcher.

use std::sync::Arc;

use futures::future::join_all;
use reqwest::StatusCode;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::attempt::{AttemptBudget, AttemptState, RetryReason};
use super::backoff::{jittered, rate_limited_delay, transport_delay};
use super::outcome::{issue_request, Outcome};
use crate::budget::RateBudget;
use crate::config::RetryPolicy;
use crate::error_handling::{DispatchError, ErrorType, ProcessingStats, WarningType};

/// Issues GET requests under a shared local budget and a per-request retry policy.
///
/// Cloning is cheap; every clone shares the HTTP client, the budget, the
/// statistics, and the cancellation token.
#[derive(Clone)]
pub struct Dispatcher {
    client: Arc<reqwest::Client>,
    budget: Arc<RateBudget>,
    policy: Arc<RetryPolicy>,
    stats: Arc<ProcessingStats>,
    cancel: CancellationToken,
}

impl Dispatcher {
    /// Creates a dispatcher with its own statistics and a token that is never cancelled.
    pub fn new(client: Arc<reqwest::Client>, budget: Arc<RateBudget>, policy: RetryPolicy) -> Self {
        Dispatcher {
            client,
            budget,
            policy: Arc::new(policy),
            stats: Arc::new(ProcessingStats::new()),
            cancel: CancellationToken::new(),
        }
    }

    /// Records outcomes into `stats` instead of a private tracker.
    pub fn with_stats(mut self, stats: Arc<ProcessingStats>) -> Self {
        self.stats = stats;
        self
    }

    /// Aborts every in-flight request when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Outcome counters for everything this dispatcher has sent.
    pub fn stats(&self) -> &Arc<ProcessingStats> {
        &self.stats
    }

    /// The retry policy applied to every request.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Sends one request to `url`, retrying until it succeeds or `max_attempts`
    /// attempts have been spent.
    ///
    /// Every attempt first takes a permit from the local budget. A denied
    /// permit, a 429, and a transport failure each spend one attempt and are
    /// retried after their own delay. Any other response is parsed as JSON and
    /// returned.
    ///
    /// # Errors
    ///
    /// - `RateLimitExhausted` if the local budget kept denying permits
    /// - `RateLimited` if the server kept answering 429
    /// - `Transport` if the last attempt failed at the connection level
    /// - `InvalidBody` if the response was not JSON
    /// - `UnexpectedStatus` for non-2xx statuses when strict status handling is on
    /// - `DeadlineExceeded` if the policy's request deadline elapsed
    /// - `Cancelled` if the dispatcher's cancellation token fired
    pub async fn dispatch_one(&self, url: &str, max_attempts: u32) -> Result<Value, DispatchError> {
        let attempts = self.run_attempts(url, max_attempts);
        let bounded = async {
            match self.policy.request_deadline {
                Some(limit) => match tokio::time::timeout(limit, attempts).await {
                    Ok(result) => result,
                    Err(_) => Err(DispatchError::DeadlineExceeded(limit)),
                },
                None => attempts.await,
            }
        };

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(DispatchError::Cancelled),
            result = bounded => result,
        };

        self.stats.record_result(&result);
        if let Err(ref e) = result {
            log::warn!("Request to {} failed: {}", url, e);
        }
        result
    }

    /// Sends one request per URL concurrently.
    ///
    /// Results come back in submission order. A failure, or even a panic, in
    /// one request only affects its own slot.
    pub async fn dispatch_all<I, S>(&self, urls: I) -> Vec<Result<Value, DispatchError>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let max_attempts = self.policy.max_attempts;
        let handles: Vec<_> = urls
            .into_iter()
            .map(|url| {
                let dispatcher = self.clone();
                let url: String = url.into();
                tokio::spawn(async move { dispatcher.dispatch_one(&url, max_attempts).await })
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .map(|joined| {
                joined.unwrap_or_else(|e| {
                    self.stats.increment_error(ErrorType::TaskFailed);
                    Err(DispatchError::TaskFailed(e.to_string()))
                })
            })
            .collect()
    }

    /// Sends `count` concurrent requests to the same `url`.
    pub async fn dispatch_batch(&self, url: &str, count: usize) -> Vec<Result<Value, DispatchError>> {
        self.dispatch_all(std::iter::repeat(url).take(count)).await
    }

    async fn run_attempts(&self, url: &str, max_attempts: u32) -> Result<Value, DispatchError> {
        let mut attempts = AttemptBudget::new(max_attempts.max(1));
        let mut state = AttemptState::Pending;

        loop {
            state = match state {
                AttemptState::Pending => self.attempt(url, &attempts).await,
                AttemptState::Retrying { delay, reason } => {
                    self.stats.increment_info(reason.info_type());
                    log::debug!(
                        "Retrying {} in {:.3}s ({}, {} attempts left)",
                        url,
                        delay.as_secs_f64(),
                        reason.as_str(),
                        attempts.remaining() - 1
                    );
                    tokio::time::sleep(delay).await;
                    attempts.spend();
                    AttemptState::Pending
                }
                AttemptState::Succeeded(value) => return Ok(value),
                AttemptState::Failed(e) => return Err(e),
            };
        }
    }

    /// Runs a single attempt and decides what comes next.
    async fn attempt(&self, url: &str, attempts: &AttemptBudget) -> AttemptState {
        let attempt_number = attempts.consumed() + 1;

        if !self.budget.try_acquire(url, 1) {
            if !attempts.can_retry() {
                return AttemptState::Failed(DispatchError::RateLimitExhausted {
                    attempts: attempt_number,
                });
            }
            let wait = self.budget.time_until_next_permit(url, 1);
            return AttemptState::Retrying {
                delay: jittered(wait, self.policy.jitter_ratio),
                reason: RetryReason::LocalBudget,
            };
        }

        match issue_request(&self.client, url).await {
            Outcome::Transport(e) => {
                if !attempts.can_retry() {
                    return AttemptState::Failed(DispatchError::Transport(e));
                }
                log::debug!("Transport error on attempt {} to {}: {}", attempt_number, url, e);
                AttemptState::Retrying {
                    delay: transport_delay(&self.policy),
                    reason: RetryReason::Transport,
                }
            }
            Outcome::RateLimited {
                status,
                retry_after,
            } => {
                if !attempts.can_retry() {
                    return AttemptState::Failed(DispatchError::RateLimited {
                        status,
                        attempts: attempt_number,
                        retry_after,
                    });
                }
                let advised =
                    retry_after.unwrap_or_else(|| self.budget.time_until_next_permit(url, 1));
                AttemptState::Retrying {
                    delay: rate_limited_delay(attempts.consumed(), &self.policy, advised),
                    reason: RetryReason::ServerRejected,
                }
            }
            Outcome::Response { status, body } => self.accept_response(url, status, &body),
        }
    }

    fn accept_response(&self, url: &str, status: StatusCode, body: &[u8]) -> AttemptState {
        if !status.is_success() {
            if self.policy.strict_status {
                return AttemptState::Failed(DispatchError::UnexpectedStatus(status.as_u16()));
            }
            // Kept as a result for compatibility with clients that read error bodies
            log::warn!(
                "Accepting status {} from {} as a result",
                status.as_u16(),
                url
            );
            self.stats
                .increment_warning(WarningType::NonSuccessStatusAccepted);
        }

        match serde_json::from_slice::<Value>(body) {
            Ok(value) => AttemptState::Succeeded(value),
            Err(source) => AttemptState::Failed(DispatchError::InvalidBody {
                status: status.as_u16(),
                source,
            }),
        }
    }
}
