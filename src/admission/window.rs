//! Fixed-window counter for a single client.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Index of the fixed window containing `now`: `floor(now / window_size)`.
///
/// Windows are aligned to the Unix epoch, not to a client's first request.
/// Times before the epoch fall into window 0.
pub(crate) fn window_index(now: SystemTime, window_size: Duration) -> u64 {
    let since_epoch = now.duration_since(UNIX_EPOCH).unwrap_or_default();
    let size = window_size.as_nanos().max(1);
    u64::try_from(since_epoch.as_nanos() / size).unwrap_or(u64::MAX)
}

/// Time left from `now` until the window containing it ends.
pub(crate) fn until_window_end(now: SystemTime, window_size: Duration) -> Duration {
    let since_epoch = now.duration_since(UNIX_EPOCH).unwrap_or_default();
    let size = window_size.as_nanos().max(1);
    let into_window = since_epoch.as_nanos() % size;
    Duration::from_nanos(u64::try_from(size - into_window).unwrap_or(u64::MAX))
}

/// Admit count for one client within one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WindowCounter {
    pub(crate) window_index: u64,
    pub(crate) count: u32,
}

impl WindowCounter {
    pub(crate) fn new(window_index: u64) -> Self {
        WindowCounter {
            window_index,
            count: 0,
        }
    }

    /// Admits one request in `current` if fewer than `max_requests` were admitted.
    ///
    /// A counter from an older window is reset before the check.
    pub(crate) fn try_admit(&mut self, current: u64, max_requests: u32) -> bool {
        if self.window_index != current {
            self.window_index = current;
            self.count = 0;
        }

        if self.count < max_requests {
            self.count += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn is_stale(&self, current: u64) -> bool {
        self.window_index < current
    }
}
