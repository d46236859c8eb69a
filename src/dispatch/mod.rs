//! Resilient request dispatch.
//!
//! A [`Dispatcher`] sends GET requests that cooperate with a rate-limited
//! server. Each attempt takes a permit from a shared [`RateBudget`] before it
//! leaves the process; a 429 from the server is retried with exponential
//! backoff capped by the server's `Retry-After` hint; connection failures are
//! retried after a fixed delay. Batches run one task per request and keep
//! results in submission order.
//!
//! [`RateBudget`]: crate::budget::RateBudget

mod attempt;
mod backoff;
mod dispatcher;
mod outcome;

pub use dispatcher::Dispatcher;
