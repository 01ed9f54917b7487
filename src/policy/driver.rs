//! The attempt loop shared by every fixed-schedule policy.

use std::time::Duration;

use super::{Operation, RetryEnv, RetryEvent};
use crate::outcome::Outcome;

/// Invoke `op` until it succeeds or `max_retries` retries have been spent.
///
/// `next_delay` is asked for the delay before retry `i` (0-based) exactly once
/// per retry, in order. A zero delay skips the timer entirely. `None` for
/// `max_retries` retries forever.
pub(crate) async fn drive<T, E, D>(
    op: &mut dyn Operation<T, E>,
    env: &RetryEnv<T, E>,
    max_retries: Option<u32>,
    next_delay: D,
) -> Outcome<T, E>
where
    D: FnMut(u32) -> Duration + Send,
{
    drive_from(op, env, max_retries, 0, next_delay).await
}

/// [`drive`] with the retry index starting at `first_retry`.
///
/// The index saturates at `u32::MAX`, so unbounded runs keep reporting
/// `attempt = u32::MAX` instead of wrapping.
pub(crate) async fn drive_from<T, E, D>(
    op: &mut dyn Operation<T, E>,
    env: &RetryEnv<T, E>,
    max_retries: Option<u32>,
    first_retry: u32,
    mut next_delay: D,
) -> Outcome<T, E>
where
    D: FnMut(u32) -> Duration + Send,
{
    let start = env.timer().now();
    let mut retry = first_retry;

    loop {
        let outcome = Outcome::classify(op.attempt().await, env.success());
        if outcome.is_success() {
            return outcome;
        }

        if max_retries.is_some_and(|max| retry >= max) {
            env.notify(&RetryEvent {
                attempt: retry.saturating_add(1),
                outcome: &outcome,
                next_delay: None,
                elapsed: env.timer().now().saturating_duration_since(start),
            });
            #[cfg(feature = "tracing")]
            tracing::debug!(
                attempts = retry.saturating_add(1),
                outcome = outcome.label(),
                "retries exhausted"
            );
            return outcome;
        }

        let delay = next_delay(retry);
        env.notify(&RetryEvent {
            attempt: retry.saturating_add(1),
            outcome: &outcome,
            next_delay: Some(delay),
            elapsed: env.timer().now().saturating_duration_since(start),
        });
        #[cfg(feature = "tracing")]
        tracing::debug!(
            attempt = retry.saturating_add(1),
            delay_ms = delay.as_millis() as u64,
            outcome = outcome.label(),
            "retrying"
        );
        drop(outcome);

        if !delay.is_zero() {
            env.timer().sleep(delay).await;
        }
        retry = retry.saturating_add(1);
    }
}
