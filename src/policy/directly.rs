use std::time::Duration;

use futures::future::BoxFuture;

use super::{driver, Operation, Policy, RetryEnv, DEFAULT_MAX_RETRIES};
use crate::outcome::Outcome;

/// Retry immediately, with no delay between attempts.
///
/// # Examples
///
/// ```rust
/// use undertow::prelude::*;
///
/// let policy = Directly::new(3);
/// assert_eq!(policy.max_retries(), Some(3));
///
/// assert_eq!(Directly::default().max_retries(), Some(5));
/// assert_eq!(Directly::forever().max_retries(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directly {
    max_retries: Option<u32>,
}

impl Directly {
    /// Up to `max_retries` retries after the first attempt.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries: Some(max_retries),
        }
    }

    /// Retry until the operation succeeds.
    pub fn forever() -> Self {
        Self { max_retries: None }
    }

    /// The retry budget, `None` if unbounded.
    pub fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }
}

impl Default for Directly {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

impl<T, E> Policy<T, E> for Directly
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn run<'a>(
        &'a self,
        op: &'a mut dyn Operation<T, E>,
        env: &'a RetryEnv<T, E>,
    ) -> BoxFuture<'a, Outcome<T, E>> {
        Box::pin(driver::drive(op, env, self.max_retries, |_| Duration::ZERO))
    }
}
