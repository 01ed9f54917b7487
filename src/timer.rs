//! The timer collaborator.
//!
//! The engine never sleeps a thread. Between attempts it awaits whatever future
//! the [`Timer`] hands back, so any runtime (or a test double) can drive it.

use std::time::{Duration, Instant};

use futures::future::BoxFuture;

/// Something that can wait for a duration.
///
/// The returned future must complete no earlier than `delay` from when it is
/// first polled; completing later is fine.
pub trait Timer: Send + Sync {
    /// A future that completes after `delay`.
    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()>;

    /// The current time on the clock `sleep` waits on.
    ///
    /// [`RetryEvent::elapsed`](crate::RetryEvent) is measured with it. A timer
    /// driven by a virtual clock should report that clock here.
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Timer backed by `tokio::time::sleep`.
///
/// Honors tokio's paused clock, which makes timing tests deterministic.
#[cfg(feature = "tokio")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[cfg(feature = "tokio")]
impl Timer for TokioTimer {
    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(delay))
    }

    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}
