//! Per-caller limiter for read requests.

use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::keyed::DashMapStateStore;
use governor::Quota;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

use crate::shared::error::{AppError, AppResult};

pub const DEFAULT_THROTTLE_RATE: &str = "10000/min";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThrottleRateError {
    #[error("throttle rate must look like `<count>/<period>`, got `{0}`")]
    Format(String),
    #[error("invalid request count in throttle rate `{0}`")]
    Count(String),
    #[error("unknown period in throttle rate `{0}`, expected s, m, h or d")]
    Period(String),
}

/// Requests allowed per period, parsed from strings such as `10000/min`.
/// Only the first letter of the period is significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleRate {
    pub num_requests: u32,
    pub period: Duration,
}

impl FromStr for ThrottleRate {
    type Err = ThrottleRateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (count, period) = s
            .split_once('/')
            .ok_or_else(|| ThrottleRateError::Format(s.to_string()))?;

        let num_requests = count
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ThrottleRateError::Count(s.to_string()))?;

        let seconds = match period.trim().chars().next() {
            Some('s') => 1,
            Some('m') => 60,
            Some('h') => 60 * 60,
            Some('d') => 24 * 60 * 60,
            _ => return Err(ThrottleRateError::Period(s.to_string())),
        };

        Ok(Self {
            num_requests,
            period: Duration::from_secs(seconds),
        })
    }
}

impl ThrottleRate {
    /// The whole budget is available as a burst and refills evenly over
    /// the period.
    pub fn quota(&self) -> Quota {
        let burst = NonZeroU32::new(self.num_requests).unwrap_or(NonZeroU32::MIN);
        let interval = self.period / burst.get();
        Quota::with_period(interval)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst)
    }
}

type KeyedLimiter<C> = governor::RateLimiter<
    String,
    DashMapStateStore<String>,
    C,
    NoOpMiddleware<<C as Clock>::Instant>,
>;

/// Idle buckets are dropped once every this many checks.
const PRUNE_EVERY: u64 = 1024;

/// Keyed GCRA limiter. Buckets live in a sharded map, so a busy caller
/// only contends on its own shard and never consumes another caller's
/// budget.
pub struct RateLimiter<C: Clock = DefaultClock> {
    limiter: KeyedLimiter<C>,
    clock: C,
    checks: AtomicU64,
    prune_every: u64,
}

impl RateLimiter {
    pub fn new(rate: ThrottleRate) -> Self {
        tracing::info!(
            num_requests = rate.num_requests,
            period_secs = rate.period.as_secs(),
            "Creating read rate limiter..."
        );
        Self::with_clock(rate, DefaultClock::default(), PRUNE_EVERY)
    }
}

impl<C: Clock + Clone> RateLimiter<C> {
    fn with_clock(rate: ThrottleRate, clock: C, prune_every: u64) -> Self {
        Self {
            limiter: governor::RateLimiter::new(
                rate.quota(),
                DashMapStateStore::default(),
                clock.clone(),
            ),
            clock,
            checks: AtomicU64::new(0),
            prune_every: prune_every.max(1),
        }
    }

    pub fn check(&self, key: &str) -> AppResult<()> {
        let result = self.limiter.check_key(&key.to_string());

        if (self.checks.fetch_add(1, Ordering::Relaxed) + 1) % self.prune_every == 0 {
            self.prune();
        }

        result.map_err(|not_until| {
            let wait = not_until.wait_time_from(self.clock.now());
            let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
            AppError::Throttled {
                retry_after: secs.max(1),
            }
        })
    }

    /// Forgets callers whose bucket has refilled completely.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Number of callers currently tracked.
    pub fn tracked_callers(&self) -> usize {
        self.limiter.len()
    }
}
