//! Output Activations for Scoring Models

/// Numerically stable logistic function
///
/// Never evaluates `exp` of a positive argument, so large magnitudes in either
/// direction saturate to 0 or 1 instead of overflowing.
pub fn sigmoid(x: f64) -> f64 {
    if x < 0.0 {
        let e = x.exp();
        e / (1.0 + e)
    } else {
        1.0 / (1.0 + (-x).exp())
    }
}

/// Activation applied to a raw model output
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Activation {
    /// Logistic function
    Sigmoid,
    /// Linear (identity)
    Linear,
}

impl Activation {
    /// Apply activation function
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            Activation::Sigmoid => sigmoid(x),
            Activation::Linear => x,
        }
    }
}
