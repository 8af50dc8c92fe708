//! Bounded-attempt background polling with one cancellation path.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::DEBUG_FLAGS;
use crate::data::ChartError;

/// Cancels the loop from anywhere; cheap to clone.
#[derive(Debug, Clone)]
pub struct PollerHandle {
    cancelled: Arc<AtomicBool>,
}

impl PollerHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Fixed-interval poll loop. Consecutive failures are counted and capped;
/// any successful tick resets the counter. Cancellations reported by a tick
/// are neither failures nor successes — a superseded fetch says nothing
/// about the endpoint's health.
pub struct Poller {
    interval: Duration,
    max_failed_attempts: u32,
    cancelled: Arc<AtomicBool>,
}

impl Poller {
    pub fn new(interval_ms: u64, max_failed_attempts: u32) -> (Self, PollerHandle) {
        let cancelled = Arc::new(AtomicBool::new(false));
        let handle = PollerHandle {
            cancelled: cancelled.clone(),
        };
        (
            Poller {
                interval: Duration::from_millis(interval_ms),
                max_failed_attempts,
                cancelled,
            },
            handle,
        )
    }

    pub async fn run<F, Fut>(self, mut tick: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), ChartError>>,
    {
        let mut consecutive_failures = 0u32;

        loop {
            tokio::time::sleep(self.interval).await;
            if self.cancelled.load(Ordering::Relaxed) {
                break;
            }

            match tick().await {
                Ok(()) => {
                    consecutive_failures = 0;
                    if DEBUG_FLAGS.print_poll_ticks {
                        log::info!("[poll] tick ok");
                    }
                }
                Err(e) if e.is_cancelled() => {
                    if DEBUG_FLAGS.print_poll_ticks {
                        log::info!("[poll] tick superseded");
                    }
                }
                Err(e) => {
                    consecutive_failures += 1;
                    // Refresh errors stay silent to the viewer; the log is all there is.
                    log::debug!(
                        "[poll] refresh failed ({consecutive_failures}/{}): {e}",
                        self.max_failed_attempts
                    );
                    if consecutive_failures >= self.max_failed_attempts {
                        log::warn!(
                            "[poll] giving up after {consecutive_failures} consecutive failures"
                        );
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[tokio::test(start_paused = true)]
    async fn test_poller_ticks_until_cancelled() {
        let (poller, handle) = Poller::new(10, 5);
        let ticks = Arc::new(AtomicU32::new(0));

        let tick_count = ticks.clone();
        let loop_handle = handle.clone();
        poller
            .run(move || {
                let n = tick_count.fetch_add(1, Ordering::Relaxed) + 1;
                if n >= 3 {
                    loop_handle.cancel();
                }
                async { Ok(()) }
            })
            .await;

        // Cancelled on the third tick; the loop notices before the fourth runs.
        assert_eq!(ticks.load(Ordering::Relaxed), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_gives_up_after_max_failures() {
        let (poller, _handle) = Poller::new(10, 3);
        let ticks = Arc::new(AtomicU32::new(0));

        let tick_count = ticks.clone();
        poller
            .run(move || {
                tick_count.fetch_add(1, Ordering::Relaxed);
                async { Err(ChartError::EmptyData) }
            })
            .await;

        assert_eq!(ticks.load(Ordering::Relaxed), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_ticks_do_not_count_as_failures() {
        let (poller, handle) = Poller::new(10, 2);
        let ticks = Arc::new(AtomicU32::new(0));

        let tick_count = ticks.clone();
        let loop_handle = handle.clone();
        poller
            .run(move || {
                let n = tick_count.fetch_add(1, Ordering::Relaxed) + 1;
                if n >= 5 {
                    loop_handle.cancel();
                }
                async { Err(ChartError::Cancelled) }
            })
            .await;

        // Five cancelled ticks never trip the max_failed_attempts=2 cap.
        assert_eq!(ticks.load(Ordering::Relaxed), 5);
    }
}
