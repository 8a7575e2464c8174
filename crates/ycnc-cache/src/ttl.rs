//! Time source and TTL arithmetic for persisted entries.
//!
//! Timestamps are wall-clock milliseconds since the Unix epoch, the same unit
//! that is written into stored entries.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Source of "now" for expiry decisions.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can hold one handle and
/// pass another to the cache.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    /// Create a clock frozen at `start_millis`.
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_millis)),
        }
    }

    /// Jump to an absolute time.
    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }

    /// Move forward by `by`.
    pub fn advance(&self, by: Duration) {
        let delta = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        self.now.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Whether an entry written at `timestamp` is expired at `now`.
///
/// The boundary itself counts as expired: `now - timestamp >= ttl`.
pub fn is_expired(timestamp: i64, now: i64, ttl_millis: i64) -> bool {
    now.saturating_sub(timestamp) >= ttl_millis
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_is_expired() {
        assert!(!is_expired(1_000, 1_999, 1_000));
        assert!(is_expired(1_000, 2_000, 1_000));
        assert!(is_expired(1_000, 5_000, 1_000));
    }

    #[test]
    fn test_future_timestamp_is_valid() {
        // Clock skew between writers must not make an entry look stale.
        assert!(!is_expired(10_000, 1_000, 1_000));
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(100);
        let other = clock.clone();

        clock.advance(Duration::from_millis(50));
        assert_eq!(other.now_millis(), 150);

        other.set(7);
        assert_eq!(clock.now_millis(), 7);
    }

    #[test]
    fn test_system_clock_is_after_epoch() {
        assert!(SystemClock.now_millis() > 0);
    }
}
