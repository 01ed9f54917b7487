//! The classified result of a single attempt.

use crate::success::Success;

/// What one attempt (or a whole retry sequence) resolved to.
///
/// Every attempt is classified into one of three shapes. A sequence ends with
/// the outcome of its final attempt; the engine never invents a separate
/// "retries exhausted" error.
///
/// # Examples
///
/// ```rust
/// use undertow::{Outcome, Success};
///
/// let even = Success::new(|n: &i32| n % 2 == 0);
///
/// assert_eq!(Outcome::<i32, ()>::classify(Ok(4), &even), Outcome::Success(4));
/// assert_eq!(Outcome::<i32, ()>::classify(Ok(3), &even), Outcome::Unmet(3));
/// assert_eq!(Outcome::<i32, &str>::classify(Err("boom"), &even), Outcome::Failure("boom"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E> {
    /// The operation produced a value accepted by the success predicate.
    Success(T),
    /// The operation failed.
    Failure(E),
    /// The operation produced a value the success predicate rejected.
    Unmet(T),
}

impl<T, E> Outcome<T, E> {
    /// Classify a raw operation result against a success predicate.
    ///
    /// The predicate is only consulted for `Ok` values.
    pub fn classify(result: Result<T, E>, success: &Success<T>) -> Self {
        match result {
            Ok(value) if success.evaluate(&value) => Outcome::Success(value),
            Ok(value) => Outcome::Unmet(value),
            Err(error) => Outcome::Failure(error),
        }
    }

    /// Returns true if this is an accepted value.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Returns true if the operation failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    /// Returns true if a value was produced but rejected.
    pub fn is_unmet(&self) -> bool {
        matches!(self, Outcome::Unmet(_))
    }

    /// Borrow the produced value, accepted or not.
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Success(v) | Outcome::Unmet(v) => Some(v),
            Outcome::Failure(_) => None,
        }
    }

    /// Borrow the failure, if any.
    pub fn failure(&self) -> Option<&E> {
        match self {
            Outcome::Failure(e) => Some(e),
            _ => None,
        }
    }

    /// Collapse into the result a caller sees.
    ///
    /// A rejected value is still the last thing the operation produced, so it
    /// comes back as `Ok`.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Outcome::Success(v) | Outcome::Unmet(v) => Ok(v),
            Outcome::Failure(e) => Err(e),
        }
    }

    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "success",
            Outcome::Failure(_) => "failure",
            Outcome::Unmet(_) => "unmet",
        }
    }
}

#[cfg(test)]
mod outcome_tests {
    use super::*;

    #[test]
    fn test_classify_uses_predicate_only_for_values() {
        let never = Success::never();
        assert_eq!(Outcome::<i32, &str>::classify(Ok(1), &never), Outcome::Unmet(1));
        assert_eq!(
            Outcome::<i32, &str>::classify(Err("e"), &never),
            Outcome::Failure("e")
        );
    }

    #[test]
    fn test_into_result_keeps_last_value() {
        assert_eq!(Outcome::<_, ()>::Unmet(7).into_result(), Ok(7));
        assert_eq!(Outcome::<(), _>::Failure("x").into_result(), Err("x"));
        assert_eq!(Outcome::<_, ()>::Success(1).into_result(), Ok(1));
    }

    #[test]
    fn test_accessors() {
        let unmet: Outcome<i32, &str> = Outcome::Unmet(2);
        assert!(unmet.is_unmet());
        assert_eq!(unmet.value(), Some(&2));
        assert_eq!(unmet.failure(), None);

        let failed: Outcome<i32, &str> = Outcome::Failure("no");
        assert!(failed.is_failure());
        assert_eq!(failed.failure(), Some(&"no"));
        assert_eq!(failed.label(), "failure");
    }
}
