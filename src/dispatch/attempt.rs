//! Per-request attempt state machine.

use std::time::Duration;

use serde_json::Value;

use crate::error_handling::{DispatchError, InfoType};

/// Why a request is about to be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RetryReason {
    /// The local budget denied a permit
    LocalBudget,
    /// The server answered 429
    ServerRejected,
    /// The request never produced a response
    Transport,
}

impl RetryReason {
    pub(crate) fn info_type(self) -> InfoType {
        match self {
            RetryReason::LocalBudget => InfoType::LocalBudgetWait,
            RetryReason::ServerRejected => InfoType::ServerRejected,
            RetryReason::Transport => InfoType::TransportRetried,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            RetryReason::LocalBudget => "local budget denied",
            RetryReason::ServerRejected => "server returned 429",
            RetryReason::Transport => "transport error",
        }
    }
}

/// State of one request between attempts.
///
/// `Pending -> {Succeeded, Retrying, Failed}`; `Retrying` goes back to
/// `Pending` once its delay has elapsed and an attempt has been spent.
#[derive(Debug)]
pub(crate) enum AttemptState {
    Pending,
    Retrying { delay: Duration, reason: RetryReason },
    Succeeded(Value),
    Failed(DispatchError),
}

/// Attempt accounting for one request.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AttemptBudget {
    max_attempts: u32,
    remaining: u32,
}

impl AttemptBudget {
    pub(crate) fn new(max_attempts: u32) -> Self {
        AttemptBudget {
            max_attempts,
            remaining: max_attempts,
        }
    }

    pub(crate) fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Attempts already spent.
    pub(crate) fn consumed(&self) -> u32 {
        self.max_attempts - self.remaining
    }

    /// Whether another attempt is allowed after the current one.
    pub(crate) fn can_retry(&self) -> bool {
        self.remaining > 1
    }

    /// Spends the current attempt.
    pub(crate) fn spend(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}
