//! # Undertow
//!
//! > *"What the wave takes, the undertow brings back"*
//!
//! Composable retry policies for asynchronous operations.
//!
//! ## Philosophy
//!
//! **Undertow** keeps the same split as any good effect system: policies are
//! pure values, and running them is the only thing that touches the world.
//! - **Policies** are immutable data: build once, share freely
//! - **Operations** are factories: every attempt starts from scratch
//! - **Collaborators** are injected: timer, randomness and success criteria
//!   are all explicit
//!
//! ## Quick Example
//!
//! ```rust
//! use undertow::prelude::*;
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! #[derive(Debug, PartialEq)]
//! enum FetchError {
//!     Timeout,
//!     NotFound,
//! }
//!
//! // Back off on timeouts, give up immediately on anything else.
//! let policy = When::<&str, FetchError>::new().on_failure(
//!     |e| *e == FetchError::Timeout,
//!     |_| Backoff::new(3, Duration::from_millis(10)).unwrap(),
//! );
//!
//! let env = RetryEnv::default();
//! let result = policy.retry(&env, || async { Err(FetchError::NotFound) }).await;
//!
//! assert_eq!(result, Err(FetchError::NotFound));
//! # });
//! ```
//!
//! ## Feature flags
//!
//! - `tokio` (default): [`TokioTimer`] and `RetryEnv::default()`
//! - `tracing`: debug events for every retry and dispatch
//! - `serde`: [`config::PolicyConfig`], policies described in configuration

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod backoff;
#[cfg(feature = "serde")]
pub mod config;
pub mod error;
pub mod jitter;
pub mod outcome;
pub mod policy;
pub mod success;
pub mod testing;
pub mod timer;

// Re-exports
pub use error::PolicyError;
pub use jitter::{Jitter, JitterState, RandomSource, SeededRandom, ThreadRandom};
pub use outcome::Outcome;
pub use policy::{
    Backoff, BoxPolicy, Directly, JitterBackoff, Operation, Pause, Policy, PolicyExt, RetryEnv,
    RetryEvent, When, DEFAULT_MAX_RETRIES,
};
pub use success::Success;
#[cfg(feature = "tokio")]
pub use timer::TokioTimer;
pub use timer::Timer;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::PolicyError;
    pub use crate::jitter::{Jitter, RandomSource, SeededRandom, ThreadRandom};
    pub use crate::outcome::Outcome;
    pub use crate::policy::{
        Backoff, BoxPolicy, Directly, JitterBackoff, Operation, Pause, Policy, PolicyExt,
        RetryEnv, RetryEvent, When,
    };
    pub use crate::success::Success;
    #[cfg(feature = "tokio")]
    pub use crate::timer::TokioTimer;
    pub use crate::timer::Timer;
}
