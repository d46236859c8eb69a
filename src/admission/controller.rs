//! Per-client fixed-window admission controller.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;

use super::window::{until_window_end, window_index, WindowCounter};

/// Admits at most `max_requests` requests per client in each fixed window.
///
/// Windows are aligned to absolute time (`floor(now / window_size)`), so a
/// client can get up to `2 * max_requests` admits in a short span straddling
/// a boundary. That burst is inherent to fixed windows and is kept as is.
///
/// All counters sit behind one mutex. A decision is a hash lookup and an
/// increment, so the lock is never held across an await.
pub struct AdmissionController {
    max_requests: u32,
    window_size: Duration,
    counters: Mutex<HashMap<String, WindowCounter>>,
}

impl AdmissionController {
    /// Creates a controller. `window_size` must be non-zero.
    pub fn new(max_requests: u32, window_size: Duration) -> Self {
        AdmissionController {
            max_requests,
            window_size,
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Admits allowed per client per window.
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Length of one fixed window.
    pub fn window_size(&self) -> Duration {
        self.window_size
    }

    // A poisoned lock only means another handler panicked mid-increment;
    // the map itself is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, WindowCounter>> {
        self.counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Decides whether `client_id` may make a request at `now`.
    ///
    /// On admit the client's counter is incremented and `true` returned; on
    /// reject nothing changes and `false` is returned.
    pub fn allow_request(&self, client_id: &str, now: SystemTime) -> bool {
        let current = window_index(now, self.window_size);
        let mut counters = self.lock();

        let counter = counters
            .entry(client_id.to_owned())
            .or_insert_with(|| WindowCounter::new(current));

        let admitted = counter.try_admit(current, self.max_requests);
        log::trace!(
            "client {} window {} count {}/{} -> {}",
            client_id,
            current,
            counter.count,
            self.max_requests,
            if admitted { "admit" } else { "reject" }
        );
        admitted
    }

    /// Time until the window containing `now` ends.
    pub fn retry_after(&self, now: SystemTime) -> Duration {
        until_window_end(now, self.window_size)
    }

    /// Number of clients with a live counter.
    pub fn tracked_clients(&self) -> usize {
        self.lock().len()
    }

    /// Drops counters belonging to windows older than the one containing `now`.
    ///
    /// Returns how many counters were removed. A client whose counter was
    /// dropped starts from zero on its next request, which is exactly what the
    /// window reset would have done.
    pub fn sweep_stale(&self, now: SystemTime) -> usize {
        let current = window_index(now, self.window_size);
        let mut counters = self.lock();
        let before = counters.len();
        counters.retain(|_, counter| !counter.is_stale(current));
        before - counters.len()
    }

    /// Starts the periodic stale-counter sweep on a background task.
    ///
    /// The task stops when `shutdown` is cancelled. A zero interval disables
    /// the sweep and returns `None`.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        every: Duration,
        shutdown: CancellationToken,
    ) -> Option<JoinHandle<()>> {
        if every.is_zero() {
            log::debug!("Window counter sweep disabled");
            return None;
        }
        let controller = Arc::clone(self);
        let mut ticker = interval(every);

        Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = controller.sweep_stale(SystemTime::now());
                        if removed > 0 {
                            log::debug!(
                                "Swept {} stale window counters ({} remaining)",
                                removed,
                                controller.tracked_clients()
                            );
                        }
                    }
                    _ = shutdown.cancelled() => {
                        log::debug!("Window counter sweeper shutting down");
                        break;
                    }
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_reject_does_not_increment() {
        let controller = AdmissionController::new(1, Duration::from_secs(60));
        assert!(controller.allow_request("a", at(0)));
        assert!(!controller.allow_request("a", at(1)));
        assert!(!controller.allow_request("a", at(2)));

        let counters = controller.lock();
        assert_eq!(counters.get("a").map(|c| c.count), Some(1));
    }

    #[test]
    fn test_retry_after_counts_down() {
        let controller = AdmissionController::new(1, Duration::from_secs(60));
        assert_eq!(controller.retry_after(at(120)), Duration::from_secs(60));
        assert_eq!(controller.retry_after(at(150)), Duration::from_secs(30));
    }

    #[test]
    fn test_sweep_stale() {
        let controller = AdmissionController::new(5, Duration::from_secs(10));
        controller.allow_request("old", at(0));
        controller.allow_request("current", at(15));
        assert_eq!(controller.tracked_clients(), 2);

        assert_eq!(controller.sweep_stale(at(15)), 1);
        assert_eq!(controller.tracked_clients(), 1);
        assert_eq!(controller.sweep_stale(at(15)), 0);
        assert_eq!(controller.sweep_stale(at(25)), 1);
        assert_eq!(controller.tracked_clients(), 0);
    }

    #[tokio::test]
    async fn test_sweeper_stops_on_cancel() {
        let controller = Arc::new(AdmissionController::new(5, Duration::from_secs(1)));
        controller.allow_request("stale", at(0));

        let shutdown = CancellationToken::new();
        let handle = controller
            .spawn_sweeper(Duration::from_millis(10), shutdown.clone())
            .expect("non-zero interval starts a sweeper");

        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while controller.tracked_clients() > 0 && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(controller.tracked_clients(), 0);

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("sweeper should exit after cancel")
            .expect("sweeper should not panic");
    }

    #[tokio::test]
    async fn test_zero_sweep_interval_is_disabled() {
        let controller = Arc::new(AdmissionController::new(5, Duration::from_secs(1)));
        controller.allow_request("stale", at(0));

        let handle = controller.spawn_sweeper(Duration::ZERO, CancellationToken::new());
        assert!(handle.is_none());
        assert_eq!(controller.tracked_clients(), 1);
    }
}
