use std::time::Duration;

use futures::future::BoxFuture;

use super::{driver, Operation, Policy, RetryEnv};
use crate::backoff::{capped, exponential};
use crate::error::PolicyError;
use crate::outcome::Outcome;

/// Retry with exponentially growing delays.
///
/// The delay before retry `i` (0-based) is `base * multiplier^i`. The
/// multiplier defaults to 2.
///
/// # Examples
///
/// ```rust
/// use undertow::Backoff;
/// use std::time::Duration;
///
/// let policy = Backoff::new(5, Duration::from_millis(100)).unwrap();
/// assert_eq!(policy.delay_for_retry(0), Duration::from_millis(100));
/// assert_eq!(policy.delay_for_retry(2), Duration::from_millis(400));
///
/// let gentle = policy.with_multiplier(1.5).unwrap();
/// assert_eq!(gentle.delay_for_retry(2), Duration::from_millis(225));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    max_retries: Option<u32>,
    base: Duration,
    multiplier: f64,
    max_delay: Option<Duration>,
}

impl Backoff {
    /// Default growth factor.
    pub const DEFAULT_MULTIPLIER: f64 = 2.0;

    /// Up to `max_retries` retries starting from `base`.
    pub fn new(max_retries: u32, base: Duration) -> Result<Self, PolicyError> {
        Self::build(Some(max_retries), base)
    }

    /// Back off from `base` until the operation succeeds.
    ///
    /// Pair this with [`with_max_delay`](Self::with_max_delay) or an outer
    /// deadline; the delays grow without bound otherwise.
    pub fn forever(base: Duration) -> Result<Self, PolicyError> {
        Self::build(None, base)
    }

    fn build(max_retries: Option<u32>, base: Duration) -> Result<Self, PolicyError> {
        Ok(Self {
            max_retries,
            base: PolicyError::require_positive("base", base)?,
            multiplier: Self::DEFAULT_MULTIPLIER,
            max_delay: None,
        })
    }

    /// Use a different growth factor.
    pub fn with_multiplier(mut self, multiplier: f64) -> Result<Self, PolicyError> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(PolicyError::InvalidMultiplier(multiplier));
        }
        self.multiplier = multiplier;
        Ok(self)
    }

    /// Never wait longer than `max_delay` between attempts.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Result<Self, PolicyError> {
        self.max_delay = Some(PolicyError::require_cap(self.base, max_delay)?);
        Ok(self)
    }

    /// The retry budget, `None` if unbounded.
    pub fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }

    /// The growth factor.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// The delay before retry `retry` (0-based).
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        capped(exponential(self.base, self.multiplier, retry), self.max_delay)
    }
}

impl<T, E> Policy<T, E> for Backoff
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn run<'a>(
        &'a self,
        op: &'a mut dyn Operation<T, E>,
        env: &'a RetryEnv<T, E>,
    ) -> BoxFuture<'a, Outcome<T, E>> {
        Box::pin(driver::drive(op, env, self.max_retries, |retry| {
            self.delay_for_retry(retry)
        }))
    }
}
