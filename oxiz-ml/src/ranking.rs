//! Candidate Ranking
//!
//! Turns per-candidate scores into an enumeration order. A ranking is a
//! permutation mapping "logical rank" to "underlying candidate index":
//! position 0 holds the index of the candidate to try first.

use rand::Rng;

use crate::TERM_FEATURE_SIZE;
use crate::models::{ModelError, ModelResult};

/// Features describing one instantiation candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TermFeatures {
    /// Order in which the term was first seen for its quantifier
    pub age: usize,
    /// Instantiation phase in which the term first appeared
    pub phase: usize,
    /// Whether the term is in the variable's relevant domain
    pub relevant: bool,
    /// Depth of the term
    pub depth: usize,
}

impl TermFeatures {
    /// Create a feature record
    pub fn new(age: usize, phase: usize, relevant: bool, depth: usize) -> Self {
        Self {
            age,
            phase,
            relevant,
            depth,
        }
    }

    /// Feature vector in model order: `[age, phase, relevant, depth]`
    pub fn to_vector(&self) -> [f64; TERM_FEATURE_SIZE] {
        [
            self.age as f64,
            self.phase as f64,
            if self.relevant { 1.0 } else { 0.0 },
            self.depth as f64,
        ]
    }
}

/// Permutation ordering candidates by descending score
///
/// The sort is stable: equal scores keep their original relative order.
pub fn ranked_permutation(scores: &[f64]) -> Vec<usize> {
    let mut permutation: Vec<usize> = (0..scores.len()).collect();
    permutation.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    permutation
}

/// Randomized local shuffle of a candidate order
///
/// Walks the positions in order; at each position, with probability
/// `swap_probability`, the element is swapped with one a few places ahead.
/// The distance starts at 1 and grows by one for every successful
/// `extend_probability` coin flip. Swaps that would leave the list are skipped,
/// so elements only drift a bounded, tunable distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalShuffle {
    swap_probability: f64,
    extend_probability: f64,
}

impl LocalShuffle {
    /// Create a shuffle; `extend_probability` must be below 1 so offsets stay finite
    pub fn new(swap_probability: f64, extend_probability: f64) -> ModelResult<Self> {
        if !(0.0..=1.0).contains(&swap_probability) {
            return Err(ModelError::InvalidConfig(format!(
                "swap probability {swap_probability} outside [0, 1]"
            )));
        }
        if !(0.0..1.0).contains(&extend_probability) {
            return Err(ModelError::InvalidConfig(format!(
                "extend probability {extend_probability} outside [0, 1)"
            )));
        }
        Ok(Self {
            swap_probability,
            extend_probability,
        })
    }

    /// Probability of attempting a swap at each position
    pub fn swap_probability(&self) -> f64 {
        self.swap_probability
    }

    /// Probability of growing the swap distance by one more step
    pub fn extend_probability(&self) -> f64 {
        self.extend_probability
    }

    /// Shuffle `items` in place
    pub fn apply<T, R: Rng + ?Sized>(&self, items: &mut [T], rng: &mut R) {
        for position in 0..items.len() {
            if !rng.random_bool(self.swap_probability) {
                continue;
            }
            let mut offset = 1;
            while rng.random_bool(self.extend_probability) {
                offset += 1;
            }
            let target = position + offset;
            if target < items.len() {
                items.swap(position, target);
            }
        }
    }

    /// Shuffled permutation of `0..len`
    pub fn permutation<R: Rng + ?Sized>(&self, len: usize, rng: &mut R) -> Vec<usize> {
        let mut permutation: Vec<usize> = (0..len).collect();
        self.apply(&mut permutation, rng);
        permutation
    }
}
