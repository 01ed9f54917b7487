//! Success evaluators.
//!
//! A [`Success`] decides whether a value an operation *did* produce is good
//! enough to stop retrying. Failures never reach it: an `Err` is always worth
//! another attempt under the bounded policies.

use std::fmt;
use std::sync::Arc;

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// A predicate over produced values.
///
/// Cheap to clone and safe to share between concurrent retry sequences.
///
/// # Examples
///
/// ```rust
/// use undertow::Success;
///
/// let three = Success::new(|n: &i32| *n == 3);
/// assert!(three.evaluate(&3));
/// assert!(!three.evaluate(&2));
///
/// let small_or_three = three.or(Success::new(|n: &i32| *n < 0));
/// assert!(small_or_three.evaluate(&-1));
/// ```
pub struct Success<T> {
    predicate: Predicate<T>,
}

impl<T> Success<T> {
    /// Build an evaluator from a predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// Accepts every value. Retries then only happen on failures.
    pub fn always() -> Self {
        Self::new(|_| true)
    }

    /// Rejects every value.
    pub fn never() -> Self {
        Self::new(|_| false)
    }

    /// Returns true if `value` should end the retry sequence.
    pub fn evaluate(&self, value: &T) -> bool {
        (self.predicate)(value)
    }
}

impl<T: 'static> Success<T> {
    /// Accept only values both evaluators accept.
    pub fn and(self, other: Success<T>) -> Self {
        Self::new(move |v| self.evaluate(v) && other.evaluate(v))
    }

    /// Accept values either evaluator accepts.
    pub fn or(self, other: Success<T>) -> Self {
        Self::new(move |v| self.evaluate(v) || other.evaluate(v))
    }
}

impl<T> Clone for Success<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T> Default for Success<T> {
    fn default() -> Self {
        Self::always()
    }
}

impl<T> fmt::Debug for Success<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Success").finish_non_exhaustive()
    }
}
