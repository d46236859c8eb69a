//! Dispatch statistics tracking.
//!
//! Thread-safe counters for successes, terminal errors, warnings, and retry
//! events, shared by every task of a batch.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::{DispatchError, ErrorType, InfoType, WarningType};

/// Thread-safe dispatch statistics tracker.
///
/// Every counter is created up front in `new()`, so lookups never miss and
/// increments are a single atomic add. Share it across tasks with `Arc`.
pub struct ProcessingStats {
    successes: AtomicUsize,
    errors: HashMap<ErrorType, AtomicUsize>,
    warnings: HashMap<WarningType, AtomicUsize>,
    info: HashMap<InfoType, AtomicUsize>,
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStats {
    /// Creates a tracker with every counter at zero.
    pub fn new() -> Self {
        ProcessingStats {
            successes: AtomicUsize::new(0),
            errors: ErrorType::iter().map(|e| (e, AtomicUsize::new(0))).collect(),
            warnings: WarningType::iter()
                .map(|w| (w, AtomicUsize::new(0)))
                .collect(),
            info: InfoType::iter().map(|i| (i, AtomicUsize::new(0))).collect(),
        }
    }

    /// Records the terminal result of one request.
    pub fn record_result<T>(&self, result: &Result<T, DispatchError>) {
        match result {
            Ok(_) => {
                self.successes.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => self.increment_error(e.error_type()),
        }
    }

    /// Counts one terminal error of `error` kind.
    pub fn increment_error(&self, error: ErrorType) {
        if let Some(counter) = self.errors.get(&error) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment error counter for {:?} which is not in the map",
                error
            );
        }
    }

    /// Counts one warning.
    pub fn increment_warning(&self, warning: WarningType) {
        if let Some(counter) = self.warnings.get(&warning) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment warning counter for {:?} which is not in the map",
                warning
            );
        }
    }

    /// Counts one retry event.
    pub fn increment_info(&self, info_type: InfoType) {
        if let Some(counter) = self.info.get(&info_type) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment info counter for {:?} which is not in the map",
                info_type
            );
        }
    }

    /// Requests that ended in success.
    pub fn successes(&self) -> usize {
        self.successes.load(Ordering::SeqCst)
    }

    /// Count for one error kind.
    pub fn get_error_count(&self, error: ErrorType) -> usize {
        self.errors
            .get(&error)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Count for one warning kind.
    pub fn get_warning_count(&self, warning: WarningType) -> usize {
        self.warnings
            .get(&warning)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Count for one retry event kind.
    pub fn get_info_count(&self, info_type: InfoType) -> usize {
        self.info
            .get(&info_type)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Get total error count across all error types.
    pub fn total_errors(&self) -> usize {
        ErrorType::iter().map(|e| self.get_error_count(e)).sum()
    }

    /// Get total warning count across all warning types.
    pub fn total_warnings(&self) -> usize {
        WarningType::iter().map(|w| self.get_warning_count(w)).sum()
    }

    /// Get total retry-event count across all info types.
    pub fn total_info(&self) -> usize {
        InfoType::iter().map(|i| self.get_info_count(i)).sum()
    }
}
