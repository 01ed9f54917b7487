//! Backoff delay calculation.
//!
//! Pure functions shared by [`Backoff`](crate::Backoff) and the
//! [`Jitter`](crate::Jitter) algorithms. Retry indices are 0-based: the first
//! retry uses index 0.

use std::time::Duration;

/// `base * multiplier^retry`, saturating at [`Duration::MAX`].
///
/// Computed on whole nanoseconds so integral multipliers give exact results.
///
/// # Examples
///
/// ```rust
/// use undertow::backoff::exponential;
/// use std::time::Duration;
///
/// let base = Duration::from_millis(100);
/// assert_eq!(exponential(base, 2.0, 0), Duration::from_millis(100));
/// assert_eq!(exponential(base, 2.0, 3), Duration::from_millis(800));
/// assert_eq!(exponential(base, 1.5, 2), Duration::from_millis(225));
/// ```
pub fn exponential(base: Duration, multiplier: f64, retry: u32) -> Duration {
    let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
    let nanos = base.as_nanos() as f64 * multiplier.powi(exponent);

    if !nanos.is_finite() || nanos >= u64::MAX as f64 {
        Duration::MAX
    } else {
        Duration::from_nanos(nanos.round() as u64)
    }
}

/// `base * 2^retry`, the sequence every jitter algorithm starts from.
///
/// ```rust
/// use undertow::backoff::doubling;
/// use std::time::Duration;
///
/// assert_eq!(doubling(Duration::from_millis(10), 4), Duration::from_millis(160));
/// ```
pub fn doubling(base: Duration, retry: u32) -> Duration {
    exponential(base, 2.0, retry)
}

/// Apply an optional upper bound.
pub fn capped(delay: Duration, max: Option<Duration>) -> Duration {
    match max {
        Some(max) => delay.min(max),
        None => delay,
    }
}

#[cfg(test)]
mod backoff_tests {
    use super::*;

    #[test]
    fn test_exponential_default_multiplier() {
        let base = Duration::from_millis(100);
        let delays: Vec<_> = (0..5).map(|i| exponential(base, 2.0, i)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(800),
                Duration::from_millis(1600),
            ]
        );
    }

    #[test]
    fn test_exponential_fractional_multiplier() {
        let base = Duration::from_secs(1);
        assert_eq!(exponential(base, 0.5, 1), Duration::from_millis(500));
        assert_eq!(exponential(base, 3.0, 2), Duration::from_secs(9));
    }

    #[test]
    fn test_exponential_saturates() {
        let base = Duration::from_secs(1);
        assert_eq!(exponential(base, 2.0, 200), Duration::MAX);
        assert_eq!(exponential(base, 10.0, u32::MAX), Duration::MAX);
    }

    #[test]
    fn test_doubling_matches_exponential() {
        let base = Duration::from_millis(7);
        for i in 0..70 {
            assert_eq!(doubling(base, i), exponential(base, 2.0, i));
        }
    }

    #[test]
    fn test_doubling_exact_past_u32_factor() {
        let base = Duration::from_nanos(1);
        assert_eq!(doubling(base, 32), Duration::from_nanos(1 << 32));
        assert_eq!(doubling(base, 40), Duration::from_nanos(1 << 40));
        assert_eq!(
            doubling(Duration::from_millis(1), 33),
            Duration::from_millis(1 << 33)
        );
    }

    #[test]
    fn test_doubling_saturates() {
        assert!(doubling(Duration::from_secs(1), 64) > Duration::from_secs(1 << 30));
    }

    #[test]
    fn test_capped() {
        let d = Duration::from_secs(10);
        assert_eq!(capped(d, None), d);
        assert_eq!(capped(d, Some(Duration::from_secs(3))), Duration::from_secs(3));
        assert_eq!(capped(d, Some(Duration::from_secs(30))), d);
    }
}
