//! OxiZ-ML: Learned Ranking for Quantifier Instantiation
//!
//! This crate provides the scoring models used to order instantiation
//! candidates during enumerative quantifier instantiation:
//! - **Scoring models**: map a small feature vector to a scalar desirability
//!   score
//! - **Ranking**: turn per-candidate scores into a permutation, or shuffle a
//!   candidate order locally without any model
//!
//! # Models
//!
//! Two backends are provided:
//! - **Sigmoid models**: a linear model passed through the logistic function,
//!   loaded from a plain coefficient list
//! - **Tree ensembles**: gradient-boosted regression trees, loaded from a
//!   LightGBM text model dump
//!
//! Both backends are pure Rust and immutable after loading. Loading failures
//! are reported as [`ModelError`]s and are meant to abort configuration.
//!
//! # Examples
//!
//! ```rust
//! use oxiz_ml::models::{ScoringModel, SigmoidModel};
//! use oxiz_ml::ranking::{TermFeatures, ranked_permutation};
//!
//! // Intercept 0, weight 1 on the age feature, trailing sentinel
//! let model = SigmoidModel::parse("0.0 1.0 0.0 0.0 0.0 -1").unwrap();
//! assert_eq!(model.num_features(), 4);
//!
//! let features = TermFeatures::new(0, 0, false, 1);
//! assert_eq!(model.predict(&features.to_vector()), 0.5);
//!
//! // Highest score first, ties keep their original order
//! assert_eq!(ranked_permutation(&[0.1, 0.9, 0.1]), vec![1, 0, 2]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

/// Scoring model implementations
pub mod models;

/// Candidate ranking and local shuffling
pub mod ranking;

// Re-export commonly used types
pub use models::{
    ModelError, ModelKind, ModelResult, ScoringModel, SigmoidModel, TreeEnsemble, load_model,
};
pub use ranking::{LocalShuffle, TermFeatures, ranked_permutation};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of features describing one instantiation candidate
pub const TERM_FEATURE_SIZE: usize = 4;

/// Common statistics for ML components
#[derive(Debug, Clone, Default)]
pub struct MLStats {
    /// Total predictions made
    pub predictions: usize,
    /// Number of candidate lists ranked
    pub rankings: usize,
    /// Average prediction time (microseconds)
    pub avg_prediction_time_us: f64,
    /// Total inference time (microseconds)
    pub total_inference_time_us: u64,
    /// Total ranking time, scoring and sorting included (microseconds)
    pub total_ranking_time_us: u64,
}

impl MLStats {
    /// Get overhead percentage relative to total time
    pub fn overhead_percentage(&self, total_solver_time_us: u64) -> f64 {
        if total_solver_time_us == 0 {
            0.0
        } else {
            (self.total_ranking_time_us as f64 / total_solver_time_us as f64) * 100.0
        }
    }

    /// Update average prediction time
    pub fn record_prediction_time(&mut self, time_us: u64) {
        self.predictions += 1;
        self.total_inference_time_us += time_us;
        self.avg_prediction_time_us = self.total_inference_time_us as f64 / self.predictions as f64;
    }

    /// Record one completed ranking
    pub fn record_ranking_time(&mut self, time_us: u64) {
        self.rankings += 1;
        self.total_ranking_time_us += time_us;
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
