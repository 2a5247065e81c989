//! Fixed-interval pacing between remote calls.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;

/// Default pause between remote calls, in milliseconds.
pub const DEFAULT_THROTTLE_MS: u64 = 4000;

/// Enforces a fixed minimum delay after remote calls.
///
/// Every call to [`wait`](Self::wait) suspends the caller for the full
/// interval. The interval never adapts; rate-limit backoff, when enabled,
/// happens inside the client on top of this floor.
#[derive(Debug)]
pub struct ThrottleGate {
    interval: Duration,
    waits: AtomicU64,
    last_finished: Mutex<Option<Instant>>,
}

impl ThrottleGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            waits: AtomicU64::new(0),
            last_finished: Mutex::new(None),
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// A gate that never sleeps.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of completed waits so far.
    #[inline]
    pub fn wait_count(&self) -> u64 {
        self.waits.load(Ordering::Acquire)
    }

    /// When the most recent wait returned, if any has.
    pub fn last_finished(&self) -> Option<Instant> {
        *self.last_finished.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Suspend for at least the configured interval.
    pub async fn wait(&self) {
        if !self.interval.is_zero() {
            tracing::trace!(interval_ms = self.interval.as_millis() as u64, "Throttling");
            tokio::time::sleep(self.interval).await;
        }
        *self.last_finished.lock().unwrap_or_else(|e| e.into_inner()) = Some(Instant::now());
        self.waits.fetch_add(1, Ordering::AcqRel);
    }
}

impl Default for ThrottleGate {
    fn default() -> Self {
        Self::from_millis(DEFAULT_THROTTLE_MS)
    }
}
