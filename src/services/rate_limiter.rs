//! Per-email throttle for OTP requests.
//!
//! The resend cooldown on the reset page only exists client side, so the
//! request endpoint keeps its own token bucket per normalised email.

use std::{
    num::NonZeroU32,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use governor::{
    clock::{Clock, DefaultClock},
    middleware::NoOpMiddleware,
    state::keyed::DashMapStateStore,
    Quota, RateLimiter,
};

use crate::errors::{AppError, Result};

/// Shrink the state store every N checks to keep memory bounded.
const SHRINK_INTERVAL: u64 = 1000;

type KeyedLimiter = RateLimiter<String, DashMapStateStore<String>, DefaultClock, NoOpMiddleware>;

#[derive(Clone)]
pub struct OtpRequestLimiter {
    limiter: Arc<KeyedLimiter>,
    clock: DefaultClock,
    checks: Arc<AtomicU64>,
}

impl OtpRequestLimiter {
    /// Allow a burst of `max_requests`, refilling the whole bucket over `window`.
    pub fn new(max_requests: u32, window: Duration) -> Result<Self> {
        let burst = NonZeroU32::new(max_requests)
            .ok_or_else(|| AppError::configuration("OTP request burst must be positive"))?;
        let period = window
            .checked_div(burst.get())
            .filter(|p| !p.is_zero())
            .ok_or_else(|| AppError::configuration("OTP request window too small"))?;
        let quota = Quota::with_period(period)
            .ok_or_else(|| AppError::configuration("OTP request window must be positive"))?
            .allow_burst(burst);

        Ok(Self {
            limiter: Arc::new(RateLimiter::keyed(quota)),
            clock: DefaultClock::default(),
            checks: Arc::new(AtomicU64::new(0)),
        })
    }

    /// `Err(seconds)` tells the caller how long to wait.
    pub fn check(&self, email: &str) -> std::result::Result<(), u64> {
        let count = self.checks.fetch_add(1, Ordering::Relaxed);
        if count % SHRINK_INTERVAL == 0 && count > 0 {
            self.limiter.retain_recent();
        }

        match self.limiter.check_key(&email.to_string()) {
            Ok(()) => Ok(()),
            Err(not_until) => Err(not_until.wait_time_from(self.clock.now()).as_secs().max(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_burst_then_blocks() {
        let limiter = OtpRequestLimiter::new(3, Duration::from_secs(600)).unwrap();
        for _ in 0..3 {
            assert!(limiter.check("a@b.com").is_ok());
        }
        let wait = limiter.check("a@b.com").unwrap_err();
        assert!(wait >= 1 && wait <= 200);
    }

    #[test]
    fn buckets_are_per_email() {
        let limiter = OtpRequestLimiter::new(1, Duration::from_secs(600)).unwrap();
        assert!(limiter.check("a@b.com").is_ok());
        assert!(limiter.check("a@b.com").is_err());
        assert!(limiter.check("c@d.com").is_ok());
    }

    #[test]
    fn rejects_zero_burst() {
        assert!(OtpRequestLimiter::new(0, Duration::from_secs(60)).is_err());
    }
}
