//! Declarative policy descriptions.
//!
//! With the `serde` feature, a policy can be described in configuration and
//! turned into a [`BoxPolicy`] at startup. Validation happens in
//! [`PolicyConfig::build`], so a bad file fails before the first retry.
//!
//! ```rust
//! use std::sync::Arc;
//! use undertow::config::PolicyConfig;
//! use undertow::{BoxPolicy, ThreadRandom};
//!
//! let config: PolicyConfig = serde_json::from_str(
//!     r#"{ "kind": "backoff", "max_retries": 3, "base_ms": 100, "multiplier": 1.5 }"#,
//! )
//! .unwrap();
//!
//! let policy: BoxPolicy<String, std::io::Error> = config.build(Arc::new(ThreadRandom)).unwrap();
//! # let _ = policy;
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::jitter::{Jitter, RandomSource};
use crate::policy::{
    Backoff, BoxPolicy, Directly, JitterBackoff, Pause, PolicyExt, DEFAULT_MAX_RETRIES,
};

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

/// Which jitter algorithm a `jitter_backoff` policy uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JitterKind {
    /// Plain doubling.
    #[default]
    None,
    /// `uniform(0, base * 2^i)`.
    Full,
    /// Half fixed, half random.
    Equal,
    /// Depends on the previous delay; requires `cap_ms`.
    Decorrelated,
}

/// A serializable description of a fixed-schedule policy.
///
/// `When` has no counterpart: its rules are code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyConfig {
    /// See [`Directly`].
    Directly {
        /// Retries after the first attempt.
        #[serde(default = "default_max_retries")]
        max_retries: u32,
        /// Ignore `max_retries` and retry until success.
        #[serde(default)]
        forever: bool,
    },
    /// See [`Pause`].
    Pause {
        /// Retries after the first attempt.
        #[serde(default = "default_max_retries")]
        max_retries: u32,
        /// Ignore `max_retries` and retry until success.
        #[serde(default)]
        forever: bool,
        /// Delay between attempts, in milliseconds.
        delay_ms: u64,
    },
    /// See [`Backoff`].
    Backoff {
        /// Retries after the first attempt.
        #[serde(default = "default_max_retries")]
        max_retries: u32,
        /// Ignore `max_retries` and retry until success.
        #[serde(default)]
        forever: bool,
        /// First delay, in milliseconds.
        base_ms: u64,
        /// Growth factor, 2.0 if absent.
        #[serde(default)]
        multiplier: Option<f64>,
        /// Upper bound on any delay, in milliseconds.
        #[serde(default)]
        max_delay_ms: Option<u64>,
    },
    /// See [`JitterBackoff`].
    JitterBackoff {
        /// Retries after the first attempt.
        #[serde(default = "default_max_retries")]
        max_retries: u32,
        /// Ignore `max_retries` and retry until success.
        #[serde(default)]
        forever: bool,
        /// First delay, in milliseconds.
        base_ms: u64,
        /// The jitter algorithm.
        #[serde(default)]
        jitter: JitterKind,
        /// Ceiling for decorrelated jitter, in milliseconds.
        #[serde(default)]
        cap_ms: Option<u64>,
        /// Upper bound on any delay, in milliseconds.
        #[serde(default)]
        max_delay_ms: Option<u64>,
    },
}

impl PolicyConfig {
    /// Validate the description and build the policy it names.
    ///
    /// `random` is only used by the jittered variants.
    pub fn build<T, E>(&self, random: Arc<dyn RandomSource>) -> Result<BoxPolicy<T, E>, PolicyError>
    where
        T: Send + 'static,
        E: Send + 'static,
    {
        let policy: BoxPolicy<T, E> = match *self {
            PolicyConfig::Directly {
                max_retries,
                forever,
            } => {
                if forever {
                    Directly::forever().boxed()
                } else {
                    Directly::new(max_retries).boxed()
                }
            }
            PolicyConfig::Pause {
                max_retries,
                forever,
                delay_ms,
            } => {
                let delay = Duration::from_millis(delay_ms);
                if forever {
                    Pause::forever(delay)?.boxed()
                } else {
                    Pause::new(max_retries, delay)?.boxed()
                }
            }
            PolicyConfig::Backoff {
                max_retries,
                forever,
                base_ms,
                multiplier,
                max_delay_ms,
            } => {
                let base = Duration::from_millis(base_ms);
                let mut policy = if forever {
                    Backoff::forever(base)?
                } else {
                    Backoff::new(max_retries, base)?
                };
                if let Some(multiplier) = multiplier {
                    policy = policy.with_multiplier(multiplier)?;
                }
                if let Some(max) = max_delay_ms {
                    policy = policy.with_max_delay(Duration::from_millis(max))?;
                }
                policy.boxed()
            }
            PolicyConfig::JitterBackoff {
                max_retries,
                forever,
                base_ms,
                jitter,
                cap_ms,
                max_delay_ms,
            } => {
                let base = Duration::from_millis(base_ms);
                let jitter = match (jitter, cap_ms) {
                    (JitterKind::None, _) => Jitter::none(),
                    (JitterKind::Full, _) => Jitter::full(random),
                    (JitterKind::Equal, _) => Jitter::equal(random),
                    (JitterKind::Decorrelated, Some(cap)) => {
                        Jitter::decorrelated(random, Duration::from_millis(cap))
                    }
                    (JitterKind::Decorrelated, None) => {
                        return Err(PolicyError::InvalidConfig(
                            "decorrelated jitter requires cap_ms".to_string(),
                        ))
                    }
                };
                let mut policy = if forever {
                    JitterBackoff::forever(base, jitter)?
                } else {
                    JitterBackoff::new(max_retries, base, jitter)?
                };
                if let Some(max) = max_delay_ms {
                    policy = policy.with_max_delay(Duration::from_millis(max))?;
                }
                policy.boxed()
            }
        };

        Ok(policy)
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;
    use crate::jitter::SeededRandom;

    fn random() -> Arc<dyn RandomSource> {
        Arc::new(SeededRandom::new(0))
    }

    #[test]
    fn test_defaults_fill_in() {
        let config: PolicyConfig = serde_json::from_str(r#"{ "kind": "directly" }"#).unwrap();
        assert_eq!(
            config,
            PolicyConfig::Directly {
                max_retries: 5,
                forever: false
            }
        );
        assert!(config.build::<(), ()>(random()).is_ok());
    }

    #[test]
    fn test_zero_pause_rejected_at_build() {
        let config: PolicyConfig =
            serde_json::from_str(r#"{ "kind": "pause", "delay_ms": 0 }"#).unwrap();
        let err = config.build::<(), ()>(random()).err();
        assert_eq!(err, Some(PolicyError::ZeroDelay { field: "delay" }));
    }

    #[test]
    fn test_decorrelated_without_cap_rejected() {
        let config: PolicyConfig = serde_json::from_str(
            r#"{ "kind": "jitter_backoff", "base_ms": 10, "jitter": "decorrelated" }"#,
        )
        .unwrap();
        assert!(matches!(
            config.build::<(), ()>(random()),
            Err(PolicyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_decorrelated_with_cap_builds() {
        let config: PolicyConfig = serde_json::from_str(
            r#"{ "kind": "jitter_backoff", "forever": true, "base_ms": 10,
                 "jitter": "decorrelated", "cap_ms": 1000 }"#,
        )
        .unwrap();
        assert!(config.build::<(), ()>(random()).is_ok());
    }

    #[test]
    fn test_bad_multiplier_rejected() {
        let config = PolicyConfig::Backoff {
            max_retries: 1,
            forever: false,
            base_ms: 10,
            multiplier: Some(-1.0),
            max_delay_ms: None,
        };
        assert_eq!(
            config.build::<(), ()>(random()).err(),
            Some(PolicyError::InvalidMultiplier(-1.0))
        );
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = PolicyConfig::Pause {
            max_retries: 2,
            forever: false,
            delay_ms: 250,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""kind":"pause""#));
        let back: PolicyConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
