//! Typed errors for configuration validation and store writes.
//!
//! Scheduling itself never fails: missing state, unaffordable archetypes and
//! unresolvable assignments all degrade to "admit nothing this cycle".

use thiserror::Error;

/// A configuration value outside its valid range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A numeric parameter failed its range check.
    #[error("invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },

    /// An archetype configuration is internally inconsistent.
    #[error("archetype {archetype}: {reason}")]
    Archetype { archetype: String, reason: String },

    /// The catalog is missing a configuration for an archetype.
    #[error("catalog has no configuration for {0}")]
    MissingArchetype(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Rejected writes to the persistent colony store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// An identifier field was empty.
    #[error("empty {0} identifier")]
    EmptyIdentifier(&'static str),

    /// The record kind cannot be held by this archetype.
    #[error("{archetype} cannot hold a {kind} assignment")]
    IncompatibleArchetype { archetype: String, kind: &'static str },

    /// The worker already holds an assignment.
    #[error("worker {0} already has an assignment")]
    DuplicateWorker(String),

    /// History samples must be recorded in increasing tick order.
    #[error("sample at tick {tick} is not after last sample at tick {last}")]
    NonMonotonicSample { last: u64, tick: u64 },

    /// A sample carried a non-finite or negative value.
    #[error("invalid economy sample: {0}")]
    InvalidSample(String),
}
