//! Linear Models for Fast Inference
//!
//! A logistic model over a fixed coefficient vector. Ultra-fast inference
//! (<1μs per prediction).
//!
//! # File format
//!
//! Whitespace-separated coefficients; the first one is the intercept, the
//! following ones weight features `0..n`. The final token is a sentinel that
//! terminates the list and is discarded.

use std::path::Path;

use super::activation::sigmoid;
use super::{ModelError, ModelResult, ScoringModel, read_model_file};
use serde::{Deserialize, Serialize};

/// Logistic model over a linear combination of the features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigmoidModel {
    /// Intercept followed by one weight per feature
    coefficients: Vec<f64>,
}

impl SigmoidModel {
    /// Create from an intercept-first coefficient vector
    pub fn from_coefficients(coefficients: Vec<f64>) -> ModelResult<Self> {
        if coefficients.is_empty() {
            return Err(ModelError::EmptyInput);
        }
        if let Some(bad) = coefficients.iter().find(|c| !c.is_finite()) {
            return Err(ModelError::InvalidConfig(format!(
                "non-finite coefficient {bad}"
            )));
        }
        Ok(Self { coefficients })
    }

    /// Parse the coefficient list format
    pub fn parse(text: &str) -> ModelResult<Self> {
        let mut tokens = Vec::new();
        for (line_ix, line) in text.lines().enumerate() {
            tokens.extend(line.split_whitespace().map(|token| (line_ix + 1, token)));
        }

        // The sentinel is whatever comes last; it is never interpreted.
        if tokens.pop().is_none() {
            return Err(ModelError::EmptyInput);
        }

        let coefficients = tokens
            .into_iter()
            .map(|(line, token)| {
                token.parse::<f64>().map_err(|e| ModelError::Parse {
                    line,
                    message: format!("invalid coefficient '{token}': {e}"),
                })
            })
            .collect::<ModelResult<Vec<_>>>()?;

        Self::from_coefficients(coefficients)
    }

    /// Load from a coefficient file
    pub fn from_file(path: impl AsRef<Path>) -> ModelResult<Self> {
        Self::parse(&read_model_file(path.as_ref())?)
    }

    /// Linear combination before the logistic function
    pub fn logit(&self, features: &[f64]) -> f64 {
        debug_assert_eq!(features.len(), self.num_features());
        let (intercept, weights) = self.coefficients.split_at(1);
        intercept[0]
            + weights
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }

    /// Get the intercept
    pub fn intercept(&self) -> f64 {
        self.coefficients[0]
    }

    /// Get the per-feature weights
    pub fn weights(&self) -> &[f64] {
        &self.coefficients[1..]
    }
}

impl ScoringModel for SigmoidModel {
    fn num_features(&self) -> usize {
        self.coefficients.len() - 1
    }

    fn predict(&self, features: &[f64]) -> f64 {
        sigmoid(self.logit(features))
    }
}
