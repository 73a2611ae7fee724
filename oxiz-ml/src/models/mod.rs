//! Scoring Model Implementations
//!
//! This module provides the models used to score instantiation candidates:
//! - Linear models passed through the logistic function
//! - Gradient-boosted regression tree ensembles
//!
//! All models are designed for:
//! - Fast single-row inference
//! - Loading from files produced by external training tooling
//! - Immutability after construction
//! - Pure Rust implementation

pub mod activation;
pub mod linear_model;
pub mod tree_ensemble;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use activation::{Activation, sigmoid};
pub use linear_model::SigmoidModel;
pub use tree_ensemble::{Objective, RegressionTree, TreeEnsemble};

/// Common trait for all scoring models
pub trait ScoringModel: fmt::Debug {
    /// Number of features the model expects per row
    fn num_features(&self) -> usize;

    /// Score a single row of features
    fn predict(&self, features: &[f64]) -> f64;
}

/// Model file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// LightGBM text model dump
    TreeEnsemble,
    /// Whitespace-separated coefficients with a trailing sentinel
    Sigmoid,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::TreeEnsemble => write!(f, "tree-ensemble"),
            ModelKind::Sigmoid => write!(f, "sigmoid"),
        }
    }
}

/// Load a model of the given kind from a file
pub fn load_model(kind: ModelKind, path: impl AsRef<Path>) -> ModelResult<Box<dyn ScoringModel>> {
    let path = path.as_ref();
    let model: Box<dyn ScoringModel> = match kind {
        ModelKind::TreeEnsemble => Box::new(TreeEnsemble::from_file(path)?),
        ModelKind::Sigmoid => Box::new(SigmoidModel::from_file(path)?),
    };
    tracing::debug!(
        "Loaded {} model from {} expecting {} features",
        kind,
        path.display(),
        model.num_features()
    );
    Ok(model)
}

/// Read a model file into memory
pub(crate) fn read_model_file(path: &Path) -> ModelResult<String> {
    std::fs::read_to_string(path).map_err(|e| ModelError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// ML model errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// The model file could not be read
    #[error("Cannot read model file {path}: {message}")]
    Io {
        /// File path
        path: String,
        /// Underlying I/O error
        message: String,
    },

    /// Malformed model text
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        got: usize,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Empty input
    #[error("Empty input provided")]
    EmptyInput,

    /// Invalid tree structure
    #[error("Invalid tree structure: {0}")]
    InvalidTree(String),
}

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;
