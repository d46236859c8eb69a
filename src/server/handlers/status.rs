//! Rate-limited `/status` handler.

use std::net::SocketAddr;
use std::time::{Duration, SystemTime};

use axum::{
    extract::{ConnectInfo, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::super::types::{RateLimitExceeded, ServerState, StatusOk};
use crate::config::RATE_LIMIT_MESSAGE;

/// Whole seconds for a `Retry-After` header, rounded up and never zero.
pub(crate) fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}

/// Admits or rejects the caller by source IP.
///
/// Admitted: `200 {"ok": true}`. Rejected: `429` with the rate-limit message
/// and a `Retry-After` header counting down to the next window.
pub async fn status_handler(
    State(state): State<ServerState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
) -> Response {
    let client_id = peer.ip().to_string();
    let now = SystemTime::now();

    if state.controller.allow_request(&client_id, now) {
        log::debug!("Admitted /status for {}", client_id);
        return (StatusCode::OK, Json(StatusOk { ok: true })).into_response();
    }

    let retry_after = retry_after_secs(state.controller.retry_after(now));
    log::info!(
        "Rate limit exceeded for {} (retry after {}s)",
        client_id,
        retry_after
    );
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, retry_after.to_string())],
        Json(RateLimitExceeded {
            message: RATE_LIMIT_MESSAGE,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_after_secs_rounds_up() {
        assert_eq!(retry_after_secs(Duration::from_millis(1_500)), 2);
        assert_eq!(retry_after_secs(Duration::from_secs(30)), 30);
    }

    #[test]
    fn test_retry_after_secs_never_zero() {
        assert_eq!(retry_after_secs(Duration::ZERO), 1);
        assert_eq!(retry_after_secs(Duration::from_millis(1)), 1);
    }
}
