//! Jitter algorithms for exponential backoff.
//!
//! Jitter spreads retries from many callers apart so they don't hammer a
//! recovering service in lockstep. Four algorithms are provided:
//!
//! - [`Jitter::none`]: `base * 2^i`, no randomness
//! - [`Jitter::full`]: `uniform(0, base * 2^i)`
//! - [`Jitter::equal`]: `base * 2^i / 2 + uniform(0, base * 2^i / 2)`
//! - [`Jitter::decorrelated`]: `base` first, then `min(cap, uniform(base, prev * 3))`
//!
//! Randomness always comes from an injected [`RandomSource`]. Use
//! [`SeededRandom`] for reproducible sequences.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use undertow::{Jitter, JitterState, SeededRandom};
//!
//! let jitter = Jitter::equal(Arc::new(SeededRandom::new(7)));
//! let base = Duration::from_millis(100);
//!
//! let (delay, _state) = jitter.next(base, 2, JitterState::default());
//! assert!(delay >= Duration::from_millis(200));
//! assert!(delay <= Duration::from_millis(400));
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::backoff::doubling;

/// A uniform source of random durations.
///
/// Shared across concurrent retry sequences, so implementations must be safe
/// to call from several tasks at once.
pub trait RandomSource: Send + Sync {
    /// A duration drawn uniformly from `[low, high]`.
    ///
    /// Returns `low` when `high <= low`.
    fn uniform(&self, low: Duration, high: Duration) -> Duration;
}

/// Draws from the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn uniform(&self, low: Duration, high: Duration) -> Duration {
        uniform_with(&mut rand::rng(), low, high)
    }
}

/// A seeded generator behind a mutex.
///
/// Two sources built from the same seed yield the same sequence, which is what
/// tests want.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    /// Create a source from a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn uniform(&self, low: Duration, high: Duration) -> Duration {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        uniform_with(&mut *rng, low, high)
    }
}

fn uniform_with<R: Rng + ?Sized>(rng: &mut R, low: Duration, high: Duration) -> Duration {
    if high <= low {
        return low;
    }
    let nanos = rng.random_range(low.as_nanos()..=high.as_nanos());
    from_nanos_u128(nanos)
}

fn from_nanos_u128(nanos: u128) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    let secs = u64::try_from(nanos / NANOS_PER_SEC).unwrap_or(u64::MAX);
    Duration::new(secs, (nanos % NANOS_PER_SEC) as u32)
}

/// Per-sequence jitter state.
///
/// Only decorrelated jitter reads it. A fresh state starts every retry
/// sequence and is threaded from one delay computation to the next; it never
/// lives on a policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JitterState {
    prev: Option<Duration>,
}

impl JitterState {
    /// The delay computed last, if any.
    pub fn previous(&self) -> Option<Duration> {
        self.prev
    }
}

/// A jitter algorithm together with its random source.
#[derive(Clone, Default)]
pub enum Jitter {
    /// Plain doubling.
    #[default]
    None,
    /// Random delay between zero and the doubled delay.
    Full(Arc<dyn RandomSource>),
    /// Half fixed, half random.
    Equal(Arc<dyn RandomSource>),
    /// Random delay between `base` and three times the previous delay.
    Decorrelated {
        /// Source of randomness.
        random: Arc<dyn RandomSource>,
        /// Upper bound on every delay after the first.
        cap: Duration,
    },
}

impl Jitter {
    /// No jitter: reproduces doubling backoff exactly.
    pub fn none() -> Self {
        Jitter::None
    }

    /// Full jitter.
    pub fn full(random: Arc<dyn RandomSource>) -> Self {
        Jitter::Full(random)
    }

    /// Equal jitter.
    pub fn equal(random: Arc<dyn RandomSource>) -> Self {
        Jitter::Equal(random)
    }

    /// Decorrelated jitter with a mandatory ceiling.
    pub fn decorrelated(random: Arc<dyn RandomSource>, cap: Duration) -> Self {
        Jitter::Decorrelated { random, cap }
    }

    /// The ceiling, for decorrelated jitter.
    pub fn cap(&self) -> Option<Duration> {
        match self {
            Jitter::Decorrelated { cap, .. } => Some(*cap),
            _ => None,
        }
    }

    /// Compute the delay before retry `attempt` (0-based).
    ///
    /// Returns the delay and the state to pass to the next call.
    pub fn next(&self, base: Duration, attempt: u32, state: JitterState) -> (Duration, JitterState) {
        let delay = match self {
            Jitter::None => doubling(base, attempt),
            Jitter::Full(random) => random.uniform(Duration::ZERO, doubling(base, attempt)),
            Jitter::Equal(random) => {
                let half = doubling(base, attempt) / 2;
                half.saturating_add(random.uniform(Duration::ZERO, half))
            }
            Jitter::Decorrelated { random, cap } => match state.prev {
                None => base,
                Some(prev) => random.uniform(base, prev.saturating_mul(3)).min(*cap),
            },
        };

        (delay, JitterState { prev: Some(delay) })
    }
}

impl fmt::Debug for Jitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Jitter::None => f.write_str("None"),
            Jitter::Full(_) => f.write_str("Full"),
            Jitter::Equal(_) => f.write_str("Equal"),
            Jitter::Decorrelated { cap, .. } => f
                .debug_struct("Decorrelated")
                .field("cap", cap)
                .finish_non_exhaustive(),
        }
    }
}
