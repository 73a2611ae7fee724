//! Staged stepping of the index tuple
//!
//! The cursor walks the index tuples of one enumerator stage by stage. Within
//! a stage it moves to the lexicographically next tuple of that stage, with
//! variable 0 as the most significant digit.
//!
//! - Max staging: stage `s` holds the tuples whose largest index is exactly
//!   `s`. Stages run from 0 to the largest candidate count minus one.
//! - Sum staging: stage `s` holds the tuples whose indices sum to exactly
//!   `s`. Stages run until the sum exceeds what the candidate counts allow.
//!
//! A variable without candidates keeps index 0 throughout.

use crate::config::StagingPolicy;

/// Enumeration cursor over index tuples
#[derive(Debug, Clone)]
pub(crate) struct Cursor {
    policy: StagingPolicy,
    /// Candidate count of each variable
    sizes: Vec<usize>,
    indices: Vec<usize>,
    /// Largest index (max) or index sum (sum) of the current stage
    stage: usize,
    /// Number of max stages
    stage_count: usize,
}

impl Cursor {
    pub(crate) fn new(policy: StagingPolicy, sizes: Vec<usize>) -> Self {
        let stage_count = sizes.iter().copied().max().unwrap_or(0).max(1);
        Self {
            policy,
            indices: vec![0; sizes.len()],
            sizes,
            stage: 0,
            stage_count,
        }
    }

    pub(crate) fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub(crate) fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub(crate) fn stage(&self) -> usize {
        self.stage
    }

    pub(crate) fn stage_count(&self) -> usize {
        self.stage_count
    }

    /// Move to the next tuple of the current stage
    pub(crate) fn step(&mut self) -> bool {
        match self.policy {
            StagingPolicy::Max => self.step_max(),
            StagingPolicy::Sum => self.step_sum(),
        }
    }

    /// Move to the first tuple of the next stage
    pub(crate) fn increase_stage(&mut self) -> bool {
        match self.policy {
            StagingPolicy::Max => self.increase_max(),
            StagingPolicy::Sum => self.increase_sum(),
        }
    }

    fn cap(&self, digit: usize) -> usize {
        self.sizes[digit].saturating_sub(1)
    }

    fn step_max(&mut self) -> bool {
        let stage = self.stage;
        let len = self.indices.len();
        for digit in (0..len).rev() {
            let current = self.indices[digit];
            let cap = stage.min(self.cap(digit));
            if current >= cap {
                continue;
            }
            // The tuple must keep an index equal to the stage: either in the
            // untouched prefix, at this digit, or at the last suffix digit able
            // to hold it.
            let prefix_at_stage = self.indices[..digit].contains(&stage);
            let suffix_slot = (digit + 1..len).rev().find(|&j| self.sizes[j] > stage);
            let value = if prefix_at_stage || suffix_slot.is_some() {
                current + 1
            } else if cap == stage {
                stage
            } else {
                continue;
            };

            self.indices[digit] = value;
            self.indices[digit + 1..].fill(0);
            if !prefix_at_stage && value != stage {
                if let Some(slot) = suffix_slot {
                    self.indices[slot] = stage;
                }
            }
            return true;
        }
        false
    }

    fn increase_max(&mut self) -> bool {
        self.stage += 1;
        if self.stage >= self.stage_count {
            return false;
        }
        let stage = self.stage;
        self.indices.fill(0);
        match (0..self.sizes.len()).rev().find(|&d| self.sizes[d] > stage) {
            Some(digit) => {
                self.indices[digit] = stage;
                true
            }
            None => false,
        }
    }

    fn step_sum(&mut self) -> bool {
        let mut suffix_sum = 0;
        for digit in (0..self.indices.len()).rev() {
            if suffix_sum > 0 && self.indices[digit] < self.cap(digit) {
                self.indices[digit] += 1;
                self.indices[digit + 1..].fill(0);
                let packed = self.pack_suffix(digit + 1, suffix_sum - 1);
                debug_assert!(packed, "suffix held the sum before");
                return packed;
            }
            suffix_sum += self.indices[digit];
        }
        false
    }

    fn increase_sum(&mut self) -> bool {
        self.stage += 1;
        self.indices.fill(0);
        self.pack_suffix(0, self.stage)
    }

    /// Spread `amount` over the digits from `from` on, filling the least
    /// significant digits first; false if they cannot hold it
    fn pack_suffix(&mut self, from: usize, mut amount: usize) -> bool {
        for digit in (from..self.indices.len()).rev() {
            if amount == 0 {
                break;
            }
            let value = amount.min(self.cap(digit));
            self.indices[digit] = value;
            amount -= value;
        }
        amount == 0
    }
}
