//! Test doubles for code built on undertow.
//!
//! # Examples
//!
//! ## RecordingTimer
//!
//! ```rust
//! use undertow::prelude::*;
//! use undertow::testing::RecordingTimer;
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let timer = RecordingTimer::new();
//! let env = RetryEnv::new(timer.clone());
//! let policy = Backoff::new(3, Duration::from_secs(1)).unwrap();
//!
//! let result = policy.retry(&env, || async { Err::<(), _>("down") }).await;
//!
//! assert_eq!(result, Err("down"));
//! assert_eq!(
//!     timer.delays(),
//!     vec![Duration::from_secs(1), Duration::from_secs(2), Duration::from_secs(4)]
//! );
//! # });
//! ```
//!
//! ## ValueStream
//!
//! ```rust
//! use undertow::prelude::*;
//! use undertow::testing::ValueStream;
//!
//! # tokio_test::block_on(async {
//! let stream = ValueStream::new();
//! let env = RetryEnv::default().with_success(Success::new(|n: &u32| *n == 3));
//!
//! let result = Directly::new(3).retry(&env, stream.operation::<()>()).await;
//!
//! assert_eq!(result, Ok(3));
//! assert_eq!(stream.calls(), 4);
//! # });
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use futures::future::{self, BoxFuture, Ready};

use crate::timer::Timer;

/// A timer that completes immediately and remembers what it was asked for.
///
/// Clones share the same log, so keep one clone for assertions and hand the
/// other to [`RetryEnv::new`](crate::RetryEnv::new). Its clock starts when
/// the recorder is created and only advances by the delays it records.
#[derive(Debug, Clone)]
pub struct RecordingTimer {
    origin: Instant,
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingTimer {
    /// An empty recorder.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            delays: Arc::default(),
        }
    }

    /// Every delay requested so far, in order.
    pub fn delays(&self) -> Vec<Duration> {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sum of all requested delays.
    pub fn total(&self) -> Duration {
        self.delays().into_iter().sum()
    }
}

impl Timer for RecordingTimer {
    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()> {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(delay);
        Box::pin(future::ready(()))
    }

    fn now(&self) -> Instant {
        self.origin + self.total()
    }
}

impl Default for RecordingTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// A counter yielding `0, 1, 2, ...`, one value per call.
///
/// Handy as an operation whose result changes on every attempt.
#[derive(Debug, Clone, Default)]
pub struct ValueStream {
    start: u32,
    next: Arc<AtomicU32>,
}

impl ValueStream {
    /// A stream starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// A stream starting at `start`.
    pub fn starting_at(start: u32) -> Self {
        Self {
            start,
            next: Arc::new(AtomicU32::new(start)),
        }
    }

    /// Take the next value.
    pub fn next_value(&self) -> u32 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    /// How many values have been taken.
    pub fn calls(&self) -> u32 {
        self.next.load(Ordering::SeqCst) - self.start
    }

    /// An operation that succeeds with the next value on every call.
    pub fn operation<E>(&self) -> impl FnMut() -> Ready<Result<u32, E>> + Send + 'static
    where
        E: Send + 'static,
    {
        let stream = self.clone();
        move || future::ready(Ok(stream.next_value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_stream_counts_calls() {
        let stream = ValueStream::starting_at(10);
        assert_eq!(stream.next_value(), 10);
        assert_eq!(stream.next_value(), 11);
        assert_eq!(stream.calls(), 2);

        let shared = stream.clone();
        shared.next_value();
        assert_eq!(stream.calls(), 3);
    }

    #[tokio::test]
    async fn test_recording_timer_logs_and_returns() {
        let timer = RecordingTimer::new();
        timer.sleep(Duration::from_secs(60)).await;
        timer.sleep(Duration::from_secs(1)).await;

        assert_eq!(
            timer.delays(),
            vec![Duration::from_secs(60), Duration::from_secs(1)]
        );
        assert_eq!(timer.total(), Duration::from_secs(61));
    }

    #[tokio::test]
    async fn test_recording_timer_clock_advances_by_recorded_delays() {
        let timer = RecordingTimer::new();
        let start = timer.now();
        timer.sleep(Duration::from_secs(5)).await;
        timer.clone().sleep(Duration::from_secs(7)).await;

        assert_eq!(timer.now() - start, Duration::from_secs(12));
    }
}
