use std::time::{Duration, Instant};

/// Transmit ceiling used when no other limit is configured.
pub const MAX_MESSAGES_PER_SECOND: u32 = 20;

/// Bounds the average transmit rate since the first send.
///
/// The rate is `sent / elapsed_whole_seconds`, measured from the first
/// time [`permits`](Self::permits) or [`record`](Self::record) is called.
/// While less than one whole second has elapsed there is no limit.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    limit: u32,
    started: Option<Instant>,
    sent: u64,
}

impl RateLimiter {
    /// Create a limiter whose window opens on first use. A `limit` of 0
    /// never blocks.
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            started: None,
            sent: 0,
        }
    }

    /// Create a limiter whose window opened at `start`.
    pub fn started_at(limit: u32, start: Instant) -> Self {
        Self {
            limit,
            started: Some(start),
            sent: 0,
        }
    }

    /// Whether one more message may be transmitted at `now`.
    pub fn permits(&mut self, now: Instant) -> bool {
        if self.limit == 0 {
            return true;
        }
        let elapsed = self.elapsed(now).as_secs();
        if elapsed == 0 {
            return true;
        }
        self.sent / elapsed < u64::from(self.limit)
    }

    /// Count one transmitted message.
    pub fn record(&mut self, now: Instant) {
        self.started.get_or_insert(now);
        self.sent += 1;
    }

    /// Messages recorded so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Configured ceiling.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    fn elapsed(&mut self, now: Instant) -> Duration {
        let start = *self.started.get_or_insert(now);
        now.saturating_duration_since(start)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(MAX_MESSAGES_PER_SECOND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_partial_second_is_unconstrained() {
        let start = Instant::now();
        let mut limiter = RateLimiter::new(20);
        for _ in 0..100 {
            assert!(limiter.permits(start));
            limiter.record(start);
        }
        assert!(limiter.permits(start + Duration::from_millis(999)));
    }

    #[test]
    fn limits_at_ceiling_after_one_second() {
        let start = Instant::now();
        let now = start + Duration::from_secs(1);
        let mut limiter = RateLimiter::started_at(20, start);

        for _ in 0..20 {
            assert!(limiter.permits(now));
            limiter.record(now);
        }
        assert!(!limiter.permits(now));
        assert!(!limiter.permits(now + Duration::from_millis(999)));
        assert!(limiter.permits(start + Duration::from_secs(2)));
    }

    #[test]
    fn rate_is_averaged_over_whole_seconds() {
        let start = Instant::now();
        let mut limiter = RateLimiter::started_at(20, start);
        for _ in 0..59 {
            limiter.record(start);
        }
        // 59 / 2 == 29, over the ceiling; 59 / 3 == 19, under it.
        assert!(!limiter.permits(start + Duration::from_secs(2)));
        assert!(limiter.permits(start + Duration::from_secs(3)));
    }

    #[test]
    fn zero_limit_never_blocks() {
        let start = Instant::now();
        let mut limiter = RateLimiter::started_at(0, start);
        for _ in 0..1000 {
            limiter.record(start);
        }
        assert!(limiter.permits(start + Duration::from_secs(1)));
        assert_eq!(limiter.sent(), 1000);
    }

    #[test]
    fn window_opens_on_first_check() {
        let start = Instant::now();
        let mut limiter = RateLimiter::new(1);
        assert!(limiter.permits(start));
        limiter.record(start);
        limiter.record(start);
        assert!(!limiter.permits(start + Duration::from_secs(1)));
    }
}
