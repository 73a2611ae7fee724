//! Configuration for enumerative instantiation

use std::path::PathBuf;

use oxiz_ml::ModelKind;
use serde::{Deserialize, Serialize};

/// How the enumerator bounds the tuples of one stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StagingPolicy {
    /// Stage `s` holds the tuples whose largest index is exactly `s`
    #[default]
    Max,
    /// Stage `s` holds the tuples whose indices sum to exactly `s`
    Sum,
}

/// How each variable's candidate list is ordered
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum RankingConfig {
    /// Discovery order
    #[default]
    None,
    /// Descending score of a model loaded from a file
    Model {
        /// File format
        kind: ModelKind,
        /// Model file
        path: PathBuf,
    },
    /// Randomized local swaps of the discovery order
    LocalShuffle {
        /// Probability of a swap at each position
        swap_probability: f64,
        /// Probability of growing a swap's distance by one
        extend_probability: f64,
        /// Seed, combined with the quantifier and variable
        seed: u64,
    },
}

/// Enumerator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumConfig {
    /// Stage bound
    pub staging: StagingPolicy,
    /// Candidate ordering
    pub ranking: RankingConfig,
    /// Do not record failures in which every position was load-bearing
    ///
    /// Each tuple is produced at most once, so such failures can never prune
    /// anything.
    pub ignore_fully_specified: bool,
}

impl Default for EnumConfig {
    fn default() -> Self {
        Self {
            staging: StagingPolicy::Max,
            ranking: RankingConfig::None,
            ignore_fully_specified: true,
        }
    }
}

impl EnumConfig {
    /// Configuration with the sum staging policy
    pub fn sum() -> Self {
        Self {
            staging: StagingPolicy::Sum,
            ..Self::default()
        }
    }
}

/// Full-saturation strategy configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Number of rounds to run (`None` = unlimited, `Some(0)` = disabled)
    pub limit: Option<usize>,
    /// Run at standard effort after other strategies added lemmas
    pub interleave: bool,
    /// Run at last-call effort, with full effort
    pub last_call: bool,
    /// Try the relevant domain before arbitrary ground terms
    pub use_relevant_domain: bool,
    /// Stop after the first effort level that added lemmas
    pub stratify: bool,
    /// Instantiations added per quantifier and effort level before moving
    /// on (`None` = enumerate every tuple)
    pub max_instances_per_quantifier: Option<usize>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            limit: None,
            interleave: false,
            last_call: true,
            use_relevant_domain: true,
            stratify: false,
            max_instances_per_quantifier: Some(1),
        }
    }
}
