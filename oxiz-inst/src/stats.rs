//! Enumeration statistics

use std::fmt;

use oxiz_ml::MLStats;

/// Counters of the enumerators and the driver sharing one context
#[derive(Debug, Clone, Default)]
pub struct EnumStats {
    /// Enumerators that reached `init`
    pub enumerators: usize,
    /// Enumerators that were exhausted right at `init`
    pub trivially_exhausted: usize,
    /// Tuples handed out by `next`
    pub tuples_produced: usize,
    /// Combinations skipped because a recorded failure generalized them
    pub tuples_pruned: usize,
    /// Failures recorded through `failure_reason`
    pub failures_recorded: usize,
    /// Stage increases across all enumerators
    pub stage_increases: usize,
    /// Driver rounds executed
    pub rounds: usize,
    /// Instantiations the driver added
    pub instantiations: usize,
    /// Ranking and prediction costs
    pub ml: MLStats,
}

impl EnumStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fraction of visited combinations the trie pruned
    pub fn prune_ratio(&self) -> f64 {
        let visited = self.tuples_produced + self.tuples_pruned;
        if visited == 0 {
            0.0
        } else {
            self.tuples_pruned as f64 / visited as f64
        }
    }
}

impl fmt::Display for EnumStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Enumeration Statistics:")?;
        writeln!(f, "  Enumerators: {}", self.enumerators)?;
        writeln!(f, "  Trivially exhausted: {}", self.trivially_exhausted)?;
        writeln!(f, "  Tuples produced: {}", self.tuples_produced)?;
        writeln!(f, "  Tuples pruned: {}", self.tuples_pruned)?;
        writeln!(f, "  Prune ratio: {:.2}", self.prune_ratio())?;
        writeln!(f, "  Failures recorded: {}", self.failures_recorded)?;
        writeln!(f, "  Stage increases: {}", self.stage_increases)?;
        writeln!(f, "  Rounds: {}", self.rounds)?;
        writeln!(f, "  Instantiations: {}", self.instantiations)?;
        writeln!(f, "  Rankings: {}", self.ml.rankings)?;
        writeln!(f, "  Predictions: {}", self.ml.predictions)?;
        writeln!(
            f,
            "  Ranking time: {:.2}ms",
            self.ml.total_ranking_time_us as f64 / 1000.0
        )?;
        writeln!(
            f,
            "  Prediction time: {:.2}ms",
            self.ml.total_inference_time_us as f64 / 1000.0
        )
    }
}
