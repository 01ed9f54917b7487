use std::time::Duration;

use futures::future::BoxFuture;

use super::{driver, Operation, Policy, RetryEnv};
use crate::error::PolicyError;
use crate::outcome::Outcome;

/// Retry after a fixed delay.
///
/// # Examples
///
/// ```rust
/// use undertow::Pause;
/// use std::time::Duration;
///
/// let policy = Pause::new(4, Duration::from_millis(250)).unwrap();
/// assert_eq!(policy.delay(), Duration::from_millis(250));
///
/// assert!(Pause::new(4, Duration::ZERO).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pause {
    max_retries: Option<u32>,
    delay: Duration,
}

impl Pause {
    /// Up to `max_retries` retries, each preceded by `delay`.
    pub fn new(max_retries: u32, delay: Duration) -> Result<Self, PolicyError> {
        Ok(Self {
            max_retries: Some(max_retries),
            delay: PolicyError::require_positive("delay", delay)?,
        })
    }

    /// Retry every `delay` until the operation succeeds.
    pub fn forever(delay: Duration) -> Result<Self, PolicyError> {
        Ok(Self {
            max_retries: None,
            delay: PolicyError::require_positive("delay", delay)?,
        })
    }

    /// The retry budget, `None` if unbounded.
    pub fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }

    /// The delay between attempts.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl<T, E> Policy<T, E> for Pause
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn run<'a>(
        &'a self,
        op: &'a mut dyn Operation<T, E>,
        env: &'a RetryEnv<T, E>,
    ) -> BoxFuture<'a, Outcome<T, E>> {
        let delay = self.delay;
        Box::pin(driver::drive(op, env, self.max_retries, move |_| delay))
    }
}
