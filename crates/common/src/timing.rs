//! Wait timing for frame delivery.
//!
//! A capture request waits a bounded amount of time for its single frame.
//! While waiting, the caller wakes up at a fixed poll interval to drain the
//! platform message queue. This module holds those two numbers and a small
//! deadline helper.

use std::time::{Duration, Instant};

/// How long to wait for a frame and how often to wake while waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Total time allowed for the frame to arrive.
    pub timeout: Duration,

    /// Interval between message-queue drains.
    pub poll_interval: Duration,
}

impl WaitPolicy {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

    /// Build a policy. A zero poll interval is raised to one millisecond.
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval: poll_interval.max(Duration::from_millis(1)),
        }
    }

    /// Start the clock for one wait.
    pub fn start(&self) -> Deadline {
        Deadline::after(self.timeout)
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT, Self::DEFAULT_POLL_INTERVAL)
    }
}

/// A fixed point in time after which a wait gives up.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    at: Instant,
}

impl Deadline {
    /// A deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        let started = Instant::now();
        Self {
            started,
            at: started + timeout,
        }
    }

    /// The instant the deadline expires.
    pub fn instant(&self) -> Instant {
        self.at
    }

    /// Time left before expiry (zero once expired).
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Time elapsed since the deadline was started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = WaitPolicy::default();
        assert_eq!(policy.timeout, Duration::from_secs(10));
        assert_eq!(policy.poll_interval, Duration::from_millis(50));
    }

    #[test]
    fn test_zero_poll_interval_is_clamped() {
        let policy = WaitPolicy::new(Duration::from_millis(100), Duration::ZERO);
        assert_eq!(policy.poll_interval, Duration::from_millis(1));
    }

    #[test]
    fn test_deadline_expiry() {
        let expired = Deadline::after(Duration::ZERO);
        assert!(expired.is_expired());
        assert_eq!(expired.remaining(), Duration::ZERO);

        let open = WaitPolicy::default().start();
        assert!(!open.is_expired());
        assert!(open.remaining() <= Duration::from_secs(10));
        assert!(open.elapsed() < Duration::from_secs(1));
    }
}
