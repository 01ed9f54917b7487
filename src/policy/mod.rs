//! Retry policies.
//!
//! A [`Policy`] takes an [`Operation`] (a factory that produces a fresh future
//! on every call) and drives it until it succeeds or the policy gives up.
//! Policies are plain values: immutable, cloneable where their parts are, and
//! safe to share between tasks. All per-call state lives inside the future
//! returned by [`Policy::run`].
//!
//! # Variants
//!
//! - [`Directly`]: retry immediately
//! - [`Pause`]: fixed delay between attempts
//! - [`Backoff`]: `base * multiplier^i`
//! - [`JitterBackoff`]: exponential backoff shaped by a [`Jitter`](crate::Jitter)
//! - [`When`]: pick a follow-up policy from the outcome of the first attempt
//!
//! # Quick Start
//!
//! ```rust
//! use undertow::prelude::*;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let calls = Arc::new(AtomicU32::new(0));
//! let policy = Pause::new(3, Duration::from_millis(1)).unwrap();
//! let env = RetryEnv::default();
//!
//! let result = policy
//!     .retry(&env, {
//!         let calls = calls.clone();
//!         move || {
//!             let n = calls.fetch_add(1, Ordering::SeqCst);
//!             async move { if n < 2 { Err("busy") } else { Ok(n) } }
//!         }
//!     })
//!     .await;
//!
//! assert_eq!(result, Ok(2));
//! assert_eq!(calls.load(Ordering::SeqCst), 3);
//! # });
//! ```

mod backoff;
mod directly;
pub(crate) mod driver;
mod jitter_backoff;
mod pause;
mod when;

pub use backoff::Backoff;
pub use directly::Directly;
pub use jitter_backoff::JitterBackoff;
pub use pause::Pause;
pub use when::When;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{AbortHandle, Abortable, BoxFuture};

use crate::outcome::Outcome;
use crate::success::Success;
use crate::timer::Timer;

/// Number of retries a policy allows when none is given.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// A re-invokable unit of asynchronous work.
///
/// Every call to [`attempt`](Operation::attempt) must start the work from
/// scratch. Implemented for any `FnMut() -> impl Future<Output = Result<T, E>>`.
pub trait Operation<T, E>: Send {
    /// Start one attempt.
    fn attempt(&mut self) -> BoxFuture<'static, Result<T, E>>;
}

impl<F, Fut, T, E> Operation<T, E> for F
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    fn attempt(&mut self) -> BoxFuture<'static, Result<T, E>> {
        Box::pin(self())
    }
}

/// Information about a failed attempt, passed to hooks.
#[derive(Debug)]
pub struct RetryEvent<'a, T, E> {
    /// Which attempt just finished (1-indexed).
    pub attempt: u32,
    /// How it ended.
    pub outcome: &'a Outcome<T, E>,
    /// Delay before the next attempt, or `None` if the policy gives up.
    pub next_delay: Option<Duration>,
    /// Time since the policy started, on the timer's clock.
    pub elapsed: Duration,
}

type Hook<T, E> = Arc<dyn Fn(&RetryEvent<'_, T, E>) + Send + Sync>;

/// Everything a policy needs besides the operation.
///
/// Holds the success evaluator, the timer and an optional retry hook. Built
/// once and shared by reference across as many runs as needed.
pub struct RetryEnv<T, E> {
    success: Success<T>,
    timer: Arc<dyn Timer>,
    hook: Option<Hook<T, E>>,
}

impl<T, E> RetryEnv<T, E> {
    /// An environment that accepts every value and sleeps on `timer`.
    pub fn new<Tm>(timer: Tm) -> Self
    where
        Tm: Timer + 'static,
    {
        Self::with_shared_timer(Arc::new(timer))
    }

    /// Like [`new`](Self::new) for a timer that is already shared.
    pub fn with_shared_timer(timer: Arc<dyn Timer>) -> Self {
        Self {
            success: Success::always(),
            timer,
            hook: None,
        }
    }

    /// Replace the success evaluator.
    pub fn with_success(mut self, success: Success<T>) -> Self {
        self.success = success;
        self
    }

    /// Register a hook called for every attempt that does not succeed.
    ///
    /// The hook runs synchronously on the retrying task; keep it short.
    pub fn with_hook<H>(mut self, hook: H) -> Self
    where
        H: Fn(&RetryEvent<'_, T, E>) + Send + Sync + 'static,
    {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// The success evaluator in effect.
    pub fn success(&self) -> &Success<T> {
        &self.success
    }

    /// The timer used between attempts.
    pub fn timer(&self) -> &dyn Timer {
        self.timer.as_ref()
    }

    pub(crate) fn notify(&self, event: &RetryEvent<'_, T, E>) {
        if let Some(hook) = &self.hook {
            hook(event);
        }
    }
}

#[cfg(feature = "tokio")]
impl<T, E> Default for RetryEnv<T, E> {
    fn default() -> Self {
        Self::new(crate::timer::TokioTimer)
    }
}

impl<T, E> Clone for RetryEnv<T, E> {
    fn clone(&self) -> Self {
        Self {
            success: self.success.clone(),
            timer: Arc::clone(&self.timer),
            hook: self.hook.clone(),
        }
    }
}

impl<T, E> fmt::Debug for RetryEnv<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryEnv")
            .field("success", &self.success)
            .field("hook", &self.hook.is_some())
            .finish_non_exhaustive()
    }
}

/// A rule for retrying an operation.
///
/// Implementations must invoke the operation at least once and never run two
/// attempts at the same time.
pub trait Policy<T, E>: Send + Sync {
    /// Drive `op` to a final outcome.
    fn run<'a>(
        &'a self,
        op: &'a mut dyn Operation<T, E>,
        env: &'a RetryEnv<T, E>,
    ) -> BoxFuture<'a, Outcome<T, E>>;
}

/// A type-erased policy.
pub type BoxPolicy<T, E> = Box<dyn Policy<T, E>>;

impl<T, E, P> Policy<T, E> for Box<P>
where
    P: Policy<T, E> + ?Sized,
{
    fn run<'a>(
        &'a self,
        op: &'a mut dyn Operation<T, E>,
        env: &'a RetryEnv<T, E>,
    ) -> BoxFuture<'a, Outcome<T, E>> {
        (**self).run(op, env)
    }
}

impl<T, E, P> Policy<T, E> for Arc<P>
where
    P: Policy<T, E> + ?Sized,
{
    fn run<'a>(
        &'a self,
        op: &'a mut dyn Operation<T, E>,
        env: &'a RetryEnv<T, E>,
    ) -> BoxFuture<'a, Outcome<T, E>> {
        (**self).run(op, env)
    }
}

/// Convenience methods for every [`Policy`].
pub trait PolicyExt<T, E>: Policy<T, E> {
    /// Retry `op` and return the last result it produced.
    ///
    /// A value the success evaluator rejected on the final attempt comes back
    /// as `Ok`; use [`retry_outcome`](Self::retry_outcome) to tell it apart.
    fn retry<'a, Op>(&'a self, env: &'a RetryEnv<T, E>, op: Op) -> BoxFuture<'a, Result<T, E>>
    where
        Op: Operation<T, E> + 'a,
        T: Send + 'a,
        E: Send + 'a,
    {
        Box::pin(async move { self.retry_outcome(env, op).await.into_result() })
    }

    /// Retry `op` and return the classified final outcome.
    fn retry_outcome<'a, Op>(
        &'a self,
        env: &'a RetryEnv<T, E>,
        op: Op,
    ) -> BoxFuture<'a, Outcome<T, E>>
    where
        Op: Operation<T, E> + 'a,
        T: Send + 'a,
        E: Send + 'a,
    {
        Box::pin(async move {
            let mut op = op;
            self.run(&mut op, env).await
        })
    }

    /// Retry `op` under an abort handle.
    ///
    /// Once [`AbortHandle::abort`] is called the sequence is not polled again:
    /// no further attempt starts and no further delay is armed. The future
    /// then resolves to `Err(Aborted)`.
    fn retry_abortable<'a, Op>(
        &'a self,
        env: &'a RetryEnv<T, E>,
        op: Op,
    ) -> (Abortable<BoxFuture<'a, Result<T, E>>>, AbortHandle)
    where
        Op: Operation<T, E> + 'a,
        T: Send + 'a,
        E: Send + 'a,
    {
        let (handle, registration) = AbortHandle::new_pair();
        (Abortable::new(self.retry(env, op), registration), handle)
    }

    /// Erase the policy type.
    fn boxed(self) -> BoxPolicy<T, E>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

impl<T, E, P: Policy<T, E> + ?Sized> PolicyExt<T, E> for P {}
