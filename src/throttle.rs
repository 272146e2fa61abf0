//! Spacing out calls to the OCR API.

use std::time::Duration;

use leaky_bucket::RateLimiter;

/// Enforces a minimum interval between remote calls.
///
/// We wait *before* each call rather than sleeping after it, so there is no
/// pointless pause once the last document is done.
pub struct Throttle {
    limiter: Option<RateLimiter>,
}

impl Throttle {
    /// Create a throttle. A zero interval disables throttling entirely.
    pub fn new(min_interval: Duration) -> Self {
        let limiter = if min_interval.is_zero() {
            None
        } else {
            // One token, refilled once per interval. The initial token makes
            // the first call immediate.
            Some(
                RateLimiter::builder()
                    .initial(1)
                    .refill(1)
                    .max(1)
                    .interval(min_interval)
                    .build(),
            )
        };
        Self { limiter }
    }

    /// Wait until the next call is allowed.
    pub async fn acquire(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.acquire_one().await;
        }
    }
}
