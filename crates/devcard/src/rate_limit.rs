//! Proactive request pacing.

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

/// Type alias for the governor rate limiter.
type GovernorRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// GitHub allows 5000 points/hour on GraphQL; 10/sec leaves room for bursts.
pub const GITHUB_DEFAULT_RPS: u32 = 10;

/// A shared API rate limiter using the governor crate.
///
/// Clones share the same bucket, so one limiter handed to several clients
/// paces all of them together.
///
/// # Example
///
/// ```ignore
/// use devcard::rate_limit::ApiRateLimiter;
///
/// let limiter = ApiRateLimiter::new(10); // 10 requests per second
///
/// // Before each API call:
/// limiter.wait().await;
/// ```
#[derive(Clone)]
pub struct ApiRateLimiter {
    inner: Arc<GovernorRateLimiter>,
    requests_per_second: u32,
}

impl ApiRateLimiter {
    /// Create a new rate limiter with the specified requests per second.
    ///
    /// A value of 0 is treated as 1.
    pub fn new(requests_per_second: u32) -> Self {
        let rps = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rps));

        Self {
            inner: Arc::new(rate_limiter),
            requests_per_second: rps.get(),
        }
    }

    /// Wait until a request is allowed by the rate limiter.
    pub async fn wait(&self) {
        self.inner.until_ready().await;
    }

    pub fn requests_per_second(&self) -> u32 {
        self.requests_per_second
    }
}

impl std::fmt::Debug for ApiRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiRateLimiter")
            .field("requests_per_second", &self.requests_per_second)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    #[test]
    fn test_zero_rps_is_clamped_to_one() {
        let limiter = ApiRateLimiter::new(0);
        assert_eq!(limiter.requests_per_second(), 1);
    }

    #[tokio::test]
    async fn test_burst_within_quota_does_not_block() {
        let limiter = ApiRateLimiter::new(100);
        let start = Instant::now();
        for _ in 0..5 {
            limiter.wait().await;
        }
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_clones_share_the_bucket() {
        let limiter = ApiRateLimiter::new(1);
        let clone = limiter.clone();
        limiter.wait().await;

        let start = Instant::now();
        clone.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(500));
    }
}
