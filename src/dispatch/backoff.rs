//! Retry delay calculations.

use std::time::Duration;

use rand::Rng;

use crate::config::RetryPolicy;

/// Delay before retrying after a 429.
///
/// Exponential in the attempts already consumed
/// (`2^consumed * backoff_base_units` units) and capped by the server's advised
/// wait, so the result never exceeds `retry_after`.
pub(crate) fn rate_limited_delay(
    consumed: u32,
    policy: &RetryPolicy,
    retry_after: Duration,
) -> Duration {
    let units = 2u64
        .checked_pow(consumed)
        .unwrap_or(u64::MAX)
        .saturating_mul(policy.backoff_base_units);
    let exponential = policy
        .backoff_unit
        .saturating_mul(u32::try_from(units).unwrap_or(u32::MAX));
    exponential.min(retry_after)
}

/// Fixed delay before retrying after a transport failure.
pub(crate) fn transport_delay(policy: &RetryPolicy) -> Duration {
    policy
        .backoff_unit
        .saturating_mul(u32::try_from(policy.transport_retry_units).unwrap_or(u32::MAX))
}

/// Adds random jitter in `[0, ratio * wait]` to a local-budget wait.
///
/// The result is never shorter than `wait`, which spreads out concurrent
/// requests that were all denied at the same moment.
pub(crate) fn jittered(wait: Duration, ratio: f64) -> Duration {
    let max_jitter = wait.as_secs_f64() * ratio.clamp(0.0, 1.0);
    if max_jitter <= 0.0 {
        return wait;
    }
    let jitter = rand::rng().random_range(0.0..=max_jitter);
    wait.saturating_add(Duration::try_from_secs_f64(jitter).unwrap_or(Duration::MAX))
}
