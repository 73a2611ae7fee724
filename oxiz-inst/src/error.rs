//! Error types for enumerative instantiation
//!
//! Only configuration problems are reported as errors. Running out of
//! candidates or combinations is a normal outcome, and contract breaches by
//! the caller (wrong mask length, stepping an exhausted enumerator) panic.

use oxiz_ml::ModelError;
use thiserror::Error;

/// Result type for instantiation configuration
pub type Result<T> = std::result::Result<T, InstError>;

/// Configuration errors of the instantiation engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InstError {
    /// The ranking model could not be loaded
    #[error("ranking model error: {0}")]
    Model(#[from] ModelError),

    /// The ranking model expects a different number of features
    #[error("ranking model expects {got} features, the enumerator provides {expected}")]
    FeatureCount {
        /// Features provided per candidate
        expected: usize,
        /// Features the model reports
        got: usize,
    },

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
