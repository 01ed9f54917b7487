//! Conditional dispatch on the outcome of an attempt.

use std::fmt;

use futures::future::BoxFuture;

use super::{BoxPolicy, Operation, Policy, RetryEnv};
use crate::outcome::Outcome;

type Rule<T, E> = Box<dyn Fn(&Outcome<T, E>) -> Option<BoxPolicy<T, E>> + Send + Sync>;

/// Choose how to retry based on what went wrong.
///
/// `When` runs the operation once. If the outcome is not a success, its rules
/// are tried in the order they were added and the first one that matches
/// supplies the policy that takes over, with the same operation and
/// environment. That policy owns every further attempt and delay. If no rule
/// matches, the outcome is returned as-is after a single attempt.
///
/// Rules can return another `When`; each level only sees its own attempts.
///
/// # Examples
///
/// ```rust
/// use undertow::prelude::*;
/// use std::time::Duration;
///
/// #[derive(Debug)]
/// enum ApiError {
///     RateLimited,
///     Unavailable,
///     BadRequest,
/// }
///
/// let policy = When::<String, ApiError>::new()
///     .on_failure(
///         |e| matches!(e, ApiError::RateLimited),
///         |_| Pause::new(3, Duration::from_secs(1)).unwrap(),
///     )
///     .on_failure(|e| matches!(e, ApiError::Unavailable), |_| Directly::new(2));
///
/// assert_eq!(policy.len(), 2);
/// ```
pub struct When<T, E> {
    rules: Vec<Rule<T, E>>,
}

impl<T, E> When<T, E> {
    /// A dispatcher with no rules. Until rules are added it never retries.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a rule over the whole outcome.
    ///
    /// Returning `None` means "no match"; the next rule is tried.
    pub fn on<F>(mut self, rule: F) -> Self
    where
        F: Fn(&Outcome<T, E>) -> Option<BoxPolicy<T, E>> + Send + Sync + 'static,
    {
        self.rules.push(Box::new(rule));
        self
    }

    /// Add a rule matching failures for which `matches` holds.
    pub fn on_failure<M, F, P>(self, matches: M, policy: F) -> Self
    where
        M: Fn(&E) -> bool + Send + Sync + 'static,
        F: Fn(&E) -> P + Send + Sync + 'static,
        P: Policy<T, E> + 'static,
    {
        self.on(move |outcome| match outcome {
            Outcome::Failure(e) if matches(e) => Some(Box::new(policy(e)) as BoxPolicy<T, E>),
            _ => None,
        })
    }

    /// Add a rule matching rejected values for which `matches` holds.
    ///
    /// Only values the success evaluator rejected reach this rule.
    pub fn on_value<M, F, P>(self, matches: M, policy: F) -> Self
    where
        M: Fn(&T) -> bool + Send + Sync + 'static,
        F: Fn(&T) -> P + Send + Sync + 'static,
        P: Policy<T, E> + 'static,
    {
        self.on(move |outcome| match outcome {
            Outcome::Unmet(v) if matches(v) => Some(Box::new(policy(v)) as BoxPolicy<T, E>),
            _ => None,
        })
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rule has been added.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The policy the first matching rule produces for `outcome`.
    pub fn dispatch(&self, outcome: &Outcome<T, E>) -> Option<BoxPolicy<T, E>> {
        self.rules.iter().find_map(|rule| rule(outcome))
    }
}

impl<T, E> Default for When<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> fmt::Debug for When<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("When")
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl<T, E> Policy<T, E> for When<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn run<'a>(
        &'a self,
        op: &'a mut dyn Operation<T, E>,
        env: &'a RetryEnv<T, E>,
    ) -> BoxFuture<'a, Outcome<T, E>> {
        Box::pin(async move {
            let outcome = Outcome::classify(op.attempt().await, env.success());
            if outcome.is_success() {
                return outcome;
            }

            match self.dispatch(&outcome) {
                Some(next) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(outcome = outcome.label(), "dispatching to matched policy");
                    drop(outcome);
                    next.run(op, env).await
                }
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(outcome = outcome.label(), "no rule matched");
                    outcome
                }
            }
        })
    }
}

#[cfg(test)]
mod when_tests {
    use super::*;
    use crate::policy::Directly;

    #[test]
    fn test_dispatch_first_match_wins() {
        let when = When::<i32, &'static str>::new()
            .on_failure(|e| e.starts_with('a'), |_| Directly::new(1))
            .on_failure(|_| true, |_| Directly::new(9));

        assert!(when.dispatch(&Outcome::Failure("abc")).is_some());
        assert!(when.dispatch(&Outcome::Failure("xyz")).is_some());
        assert!(when.dispatch(&Outcome::Unmet(3)).is_none());
    }

    #[test]
    fn test_value_rules_ignore_failures() {
        let when = When::<i32, &'static str>::new().on_value(|v| *v == 0, |_| Directly::new(1));

        assert!(when.dispatch(&Outcome::Unmet(0)).is_some());
        assert!(when.dispatch(&Outcome::Unmet(1)).is_none());
        assert!(when.dispatch(&Outcome::Failure("0")).is_none());
    }

    #[test]
    fn test_empty_and_debug() {
        let when: When<(), ()> = When::default();
        assert!(when.is_empty());
        assert_eq!(format!("{:?}", when), "When { rules: 0 }");
    }
}
