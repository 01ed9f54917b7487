use std::time::Duration;

use futures::future::BoxFuture;

use super::{driver, Operation, Policy, RetryEnv};
use crate::backoff::capped;
use crate::error::PolicyError;
use crate::jitter::{Jitter, JitterState};
use crate::outcome::Outcome;

/// Exponential backoff shaped by a [`Jitter`] algorithm.
///
/// Each run starts from a fresh [`JitterState`], so concurrent callers of one
/// policy value never see each other's delays.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use undertow::{Jitter, JitterBackoff, SeededRandom};
///
/// let random = Arc::new(SeededRandom::new(1));
/// let policy = JitterBackoff::new(
///     5,
///     Duration::from_millis(100),
///     Jitter::decorrelated(random, Duration::from_secs(10)),
/// )
/// .unwrap();
/// assert_eq!(policy.max_retries(), Some(5));
///
/// // A decorrelated cap below the base delay can never be honored.
/// let bad = JitterBackoff::forever(
///     Duration::from_secs(1),
///     Jitter::decorrelated(Arc::new(SeededRandom::new(1)), Duration::from_millis(1)),
/// );
/// assert!(bad.is_err());
/// ```
#[derive(Debug, Clone)]
pub struct JitterBackoff {
    max_retries: Option<u32>,
    base: Duration,
    jitter: Jitter,
    max_delay: Option<Duration>,
}

impl JitterBackoff {
    /// Up to `max_retries` retries starting from `base`.
    pub fn new(max_retries: u32, base: Duration, jitter: Jitter) -> Result<Self, PolicyError> {
        Self::build(Some(max_retries), base, jitter)
    }

    /// Keep retrying until the operation succeeds.
    ///
    /// Bound the sequence from outside, for example with
    /// `tokio::time::timeout` around the returned future.
    pub fn forever(base: Duration, jitter: Jitter) -> Result<Self, PolicyError> {
        Self::build(None, base, jitter)
    }

    fn build(
        max_retries: Option<u32>,
        base: Duration,
        jitter: Jitter,
    ) -> Result<Self, PolicyError> {
        let base = PolicyError::require_positive("base", base)?;
        if let Some(cap) = jitter.cap() {
            PolicyError::require_cap(base, cap)?;
        }
        Ok(Self {
            max_retries,
            base,
            jitter,
            max_delay: None,
        })
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

    /// The jitter algorithm in use.
    pub fn jitter(&self) -> &Jitter {
        &self.jitter
    }
}

impl<T, E> Policy<T, E> for JitterBackoff
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn run<'a>(
        &'a self,
        op: &'a mut dyn Operation<T, E>,
        env: &'a RetryEnv<T, E>,
    ) -> BoxFuture<'a, Outcome<T, E>> {
        let mut state = JitterState::default();
        Box::pin(driver::drive(op, env, self.max_retries, move |retry| {
            let (delay, next) = self.jitter.next(self.base, retry, state);
            state = next;
            capped(delay, self.max_delay)
        }))
    }
}
