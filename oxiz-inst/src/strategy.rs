//! Full-saturation instantiation strategy
//!
//! Drives one enumerator per asserted quantifier and hands every tuple to the
//! quantifier engine until an instantiation sticks. Effort levels:
//! - Level 0: candidates from the relevant domain, computed first
//! - Level 1: arbitrary ground terms of each variable's sort
//!
//! Level 0 runs when the relevant domain is enabled and available; level 1
//! runs when the relevant domain is disabled, or at full (last-call) effort.

use std::time::Instant;

use rustc_hash::FxHashSet;

use crate::config::StrategyConfig;
use crate::context::EnumContext;
use crate::enumerator::TermTupleEnumerator;
use crate::source::CandidateSource;
use crate::term::{Quantifier, QuantifierId, RelevantDomain, TermDatabase, TermId, TermServices};

/// Effort at which the quantifier engine runs its strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum QuantEffort {
    /// Regular check, interleaved with the other strategies
    Standard,
    /// Final check before answering sat
    LastCall,
}

/// Result of handing one tuple to the quantifier engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstantiationOutcome {
    /// The instance was added as a lemma
    Added,
    /// The instance was added before
    Duplicate,
    /// The instance was useless
    Failed {
        /// Positions responsible for the failure, if known
        mask: Option<Vec<bool>>,
    },
}

/// The quantifier engine as seen by the strategy
pub trait QuantifierEngine {
    /// Quantified formulas currently asserted
    fn asserted_quantifiers(&self) -> Vec<Quantifier>;

    /// Whether the quantifier still needs instantiation
    fn is_active(&self, _quantifier: &Quantifier) -> bool {
        true
    }

    /// Whether this strategy is responsible for the quantifier
    fn owns(&self, _quantifier: &Quantifier) -> bool {
        true
    }

    /// Instantiate the quantifier with the tuple; `None` stands for a
    /// variable without candidates
    fn try_instantiate(
        &mut self,
        quantifier: &Quantifier,
        terms: &[Option<TermId>],
    ) -> InstantiationOutcome;

    /// Whether the solver found a conflict
    fn in_conflict(&self) -> bool;

    /// Whether some strategy added a lemma in the current round
    fn has_added_lemma(&self) -> bool;

    /// Whether the theory engine still has work before a last call
    fn theory_needs_check(&self) -> bool {
        false
    }

    /// Whether the engine instantiates at the given effort
    fn wants_instantiation(&self, _effort: QuantEffort) -> bool {
        true
    }
}

/// What one `check` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundSummary {
    /// Whether the strategy ran at all
    pub ran: bool,
    /// Quantifiers processed
    pub processed: usize,
    /// Quantifiers that received at least one instantiation
    pub instantiated: usize,
    /// Instantiations added
    pub added: usize,
    /// Whether the round stopped on a conflict
    pub conflict: bool,
}

/// Enumerative (full-saturation) instantiation strategy
#[derive(Debug, Clone)]
pub struct EnumerativeStrategy {
    config: StrategyConfig,
    /// Rounds left (`None` = unlimited)
    remaining: Option<usize>,
}

impl EnumerativeStrategy {
    /// Create a strategy with the given configuration
    pub fn new(config: StrategyConfig) -> Self {
        let remaining = config.limit;
        Self { config, remaining }
    }

    /// Get the configuration
    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Rounds left before the strategy disables itself
    pub fn remaining_rounds(&self) -> Option<usize> {
        self.remaining
    }

    /// Re-arm the round limit before a satisfiability check
    pub fn presolve(&mut self) {
        self.remaining = self.config.limit;
    }

    /// Whether the strategy wants to run at the given effort
    pub fn needs_check(&self, effort: QuantEffort, engine: &dyn QuantifierEngine) -> bool {
        if self.remaining == Some(0) {
            return false;
        }
        if self.config.interleave && engine.wants_instantiation(effort) {
            return true;
        }
        self.config.last_call && effort >= QuantEffort::LastCall
    }

    /// Run one round of instantiation
    pub fn check(
        &mut self,
        effort: QuantEffort,
        ctx: &EnumContext,
        db: &dyn TermDatabase,
        mut relevant_domain: Option<&mut dyn RelevantDomain>,
        engine: &mut dyn QuantifierEngine,
    ) -> RoundSummary {
        let mut summary = RoundSummary::default();
        let mut do_check = false;
        let mut full_effort = false;
        if self.remaining != Some(0) {
            if self.config.interleave {
                // Only worth it alongside the lemmas of other strategies.
                do_check = effort == QuantEffort::Standard && engine.has_added_lemma();
            }
            if self.config.last_call && !do_check && !engine.theory_needs_check() {
                do_check = effort == QuantEffort::LastCall;
                full_effort = true;
            }
        }
        if !do_check {
            return summary;
        }
        debug_assert!(!engine.in_conflict());
        summary.ran = true;

        let start = Instant::now();
        tracing::debug!(
            target: "fs_engine",
            "---Full Saturation Round, effort = {:?}---",
            effort
        );

        let first_level = if self.config.use_relevant_domain { 0 } else { 1 };
        let last_level = if full_effort { 1 } else { first_level };
        let quantifiers = engine.asserted_quantifiers();
        let mut already_processed: FxHashSet<QuantifierId> = FxHashSet::default();

        for level in first_level..=last_level {
            if level == 0 {
                let Some(rd) = relevant_domain.as_deref_mut() else {
                    continue;
                };
                tracing::debug!(target: "inst_alg", "-> Relevant domain instantiate...");
                rd.compute();
            } else {
                tracing::debug!(target: "inst_alg", "-> Ground term instantiate...");
            }
            let services = TermServices {
                db,
                relevant_domain: relevant_domain.as_deref(),
            };

            for quantifier in &quantifiers {
                if !engine.owns(quantifier)
                    || !engine.is_active(quantifier)
                    || already_processed.contains(&quantifier.id())
                {
                    continue;
                }
                summary.processed += 1;
                let added = self.process(quantifier, full_effort, level == 0, ctx, services, engine);
                if added > 0 {
                    if !self.config.stratify {
                        already_processed.insert(quantifier.id());
                    }
                    summary.instantiated += 1;
                    summary.added += added;
                }
                if engine.in_conflict() {
                    break;
                }
            }
            if engine.in_conflict() || (summary.instantiated > 0 && self.config.stratify) {
                break;
            }
        }
        summary.conflict = engine.in_conflict();

        {
            let mut stats = ctx.stats_mut();
            stats.rounds += 1;
            stats.instantiations += summary.added;
        }
        tracing::debug!(target: "fs_engine", "Added lemmas = {}", summary.added);
        tracing::debug!(
            target: "fs_engine",
            "Finished full saturation engine, time = {:?}",
            start.elapsed()
        );

        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        summary
    }

    /// Enumerate tuples for one quantifier until the per-quantifier budget is
    /// spent, the tuples run out or a conflict appears; returns the number of
    /// instantiations added
    pub fn process(
        &self,
        quantifier: &Quantifier,
        full_effort: bool,
        use_relevant_domain: bool,
        ctx: &EnumContext,
        services: TermServices<'_>,
        engine: &mut dyn QuantifierEngine,
    ) -> usize {
        let source = if use_relevant_domain {
            match services.relevant_domain {
                Some(rd) => CandidateSource::relevant_domain(rd),
                None => return 0,
            }
        } else {
            CandidateSource::basic(services.db)
        };
        let mut enumerator =
            TermTupleEnumerator::new(quantifier, ctx, source, services, full_effort);
        enumerator.init();

        let budget = self.config.max_instances_per_quantifier;
        let mut terms = Vec::new();
        let mut added = 0;
        while enumerator.has_next() {
            if engine.in_conflict() {
                break;
            }
            enumerator.next(&mut terms);
            match engine.try_instantiate(quantifier, &terms) {
                InstantiationOutcome::Added => {
                    tracing::trace!(target: "inst_alg_rd", "Success!");
                    added += 1;
                    if budget.is_some_and(|budget| added >= budget) {
                        break;
                    }
                }
                InstantiationOutcome::Duplicate => {}
                InstantiationOutcome::Failed { mask: Some(mask) } => {
                    enumerator.failure_reason(&mask);
                }
                InstantiationOutcome::Failed { mask: None } => {}
            }
        }
        added
    }
}
