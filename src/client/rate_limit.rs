//! Sliding-window rate limiting for outbound API calls
//!
//! Tracks recent request timestamps and admits a new call only while fewer
//! than `max_requests` landed inside the window. Timestamps older than the
//! window are pruned on every check. Single sequential caller assumed; no
//! persistence across process restarts.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

/// Time-windowed request counter
pub struct RequestWindow {
    timestamps: VecDeque<DateTime<Utc>>,
    max_requests: usize,
    window: Duration,
}

impl RequestWindow {
    /// Create a limiter admitting `max_requests` per `window_secs` seconds
    pub fn new(max_requests: usize, window_secs: u64) -> Self {
        Self {
            timestamps: VecDeque::new(),
            max_requests,
            window: Duration::seconds(window_secs as i64),
        }
    }

    /// Whether the request budget has room for one more call
    pub fn can_make_request(&mut self) -> bool {
        self.can_make_request_at(Utc::now())
    }

    /// Record a request against the budget
    pub fn add_request(&mut self) {
        self.add_request_at(Utc::now());
    }

    fn can_make_request_at(&mut self, now: DateTime<Utc>) -> bool {
        self.prune(now);
        self.timestamps.len() < self.max_requests
    }

    fn add_request_at(&mut self, now: DateTime<Utc>) {
        self.timestamps.push_back(now);
    }

    fn prune(&mut self, now: DateTime<Utc>) {
        while let Some(oldest) = self.timestamps.front() {
            if now - *oldest >= self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_until_budget_exhausted() {
        let mut limiter = RequestWindow::new(3, 60);
        let now = Utc::now();

        for _ in 0..3 {
            assert!(limiter.can_make_request_at(now));
            limiter.add_request_at(now);
        }

        assert!(!limiter.can_make_request_at(now));
    }

    #[test]
    fn test_budget_restored_after_window() {
        let mut limiter = RequestWindow::new(10, 60);
        let start = Utc::now();

        for _ in 0..10 {
            limiter.add_request_at(start);
        }
        assert!(!limiter.can_make_request_at(start));

        // Just inside the window the budget is still exhausted
        let almost = start + Duration::seconds(59);
        assert!(!limiter.can_make_request_at(almost));

        // Once the window elapses the old timestamps are pruned
        let later = start + Duration::seconds(60);
        assert!(limiter.can_make_request_at(later));
    }

    #[test]
    fn test_partial_pruning() {
        let mut limiter = RequestWindow::new(2, 60);
        let start = Utc::now();

        limiter.add_request_at(start);
        limiter.add_request_at(start + Duration::seconds(30));
        assert!(!limiter.can_make_request_at(start + Duration::seconds(30)));

        // First request falls out, second is still inside
        assert!(limiter.can_make_request_at(start + Duration::seconds(61)));
        limiter.add_request_at(start + Duration::seconds(61));
        assert!(!limiter.can_make_request_at(start + Duration::seconds(61)));
    }

    #[test]
    fn test_zero_budget_never_admits() {
        let mut limiter = RequestWindow::new(0, 60);
        assert!(!limiter.can_make_request());
    }
}
