//! Construction-time errors.
//!
//! Policies validate their parameters when they are built. A policy value that
//! exists is always runnable, so nothing here is ever produced mid-retry.

use std::time::Duration;

/// Error returned when a policy is built from invalid parameters.
///
/// # Examples
///
/// ```rust
/// use undertow::{Pause, PolicyError};
/// use std::time::Duration;
///
/// let err = Pause::new(3, Duration::ZERO).unwrap_err();
/// assert_eq!(err, PolicyError::ZeroDelay { field: "delay" });
/// ```
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    /// A delay that must be positive was zero.
    #[error("{field} must be greater than zero")]
    ZeroDelay {
        /// Which parameter was zero.
        field: &'static str,
    },
    /// The backoff multiplier was not a finite positive number.
    #[error("multiplier must be finite and positive, got {0}")]
    InvalidMultiplier(f64),
    /// A delay cap was smaller than the base delay it bounds.
    #[error("cap {cap:?} is below base delay {base:?}")]
    CapBelowBase {
        /// The base delay.
        base: Duration,
        /// The offending cap.
        cap: Duration,
    },
    /// A declarative policy description could not be turned into a policy.
    #[error("invalid policy config: {0}")]
    InvalidConfig(String),
}

impl PolicyError {
    pub(crate) fn require_positive(
        field: &'static str,
        delay: Duration,
    ) -> Result<Duration, PolicyError> {
        if delay.is_zero() {
            Err(PolicyError::ZeroDelay { field })
        } else {
            Ok(delay)
        }
    }

    pub(crate) fn require_cap(base: Duration, cap: Duration) -> Result<Duration, PolicyError> {
        if cap < base {
            Err(PolicyError::CapBelowBase { base, cap })
        } else {
            Ok(cap)
        }
    }
}
