//! Term-tuple enumerator
//!
//! A pull-based generator of instantiation tuples for one quantifier and one
//! round. The caller drives it with:
//!
//! 1. [`TermTupleEnumerator::init`] to collect and rank candidates
//! 2. [`TermTupleEnumerator::has_next`] / [`TermTupleEnumerator::next`] to
//!    obtain each tuple
//! 3. [`TermTupleEnumerator::failure_reason`] after a fruitless tuple, naming
//!    the positions responsible, so that every tuple agreeing on those
//!    positions is skipped
//!
//! An exhausted enumerator stays exhausted until `init` runs again, which
//! collects the candidates anew and starts over from the first tuple.

mod staging;

use std::fmt;

use crate::context::EnumContext;
use crate::index_trie::IndexTrie;
use crate::source::CandidateSource;
use crate::term::{Quantifier, TermId, TermServices};

use staging::Cursor;

/// Lifecycle of an enumerator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumState {
    /// `init` has not run yet
    Uninitialized,
    /// Tuples may remain
    Ready,
    /// No tuple remains
    Exhausted,
}

/// Enumerator of term tuples for one quantifier
pub struct TermTupleEnumerator<'a> {
    quantifier: &'a Quantifier,
    context: &'a EnumContext,
    source: CandidateSource<'a>,
    services: TermServices<'a>,
    /// Iterate variables without candidates instead of giving up
    full_effort: bool,
    state: EnumState,
    step_counter: usize,
    cursor: Cursor,
    /// Per variable: rank to discovery index
    permutations: Vec<Vec<usize>>,
    /// Failed partial tuples
    disabled: IndexTrie,
    /// Positions at or beyond this are wildcards in every recorded failure
    change_prefix: usize,
}

impl<'a> TermTupleEnumerator<'a> {
    /// Create an enumerator; nothing is computed before [`Self::init`]
    pub fn new(
        quantifier: &'a Quantifier,
        context: &'a EnumContext,
        source: CandidateSource<'a>,
        services: TermServices<'a>,
        full_effort: bool,
    ) -> Self {
        let config = context.config();
        Self {
            quantifier,
            context,
            source,
            services,
            full_effort,
            state: EnumState::Uninitialized,
            step_counter: 0,
            cursor: Cursor::new(config.staging, Vec::new()),
            permutations: Vec::new(),
            disabled: IndexTrie::new(config.ignore_fully_specified),
            change_prefix: 0,
        }
    }

    /// Collect the candidates of every variable and rank them
    ///
    /// Registers every candidate with the context and moves the quantifier to
    /// its next phase if any candidate was new.
    pub fn init(&mut self) {
        let quantifier = self.quantifier;
        let qid = quantifier.id();
        tracing::debug!(target: "inst_alg", "Initializing enumeration of {}", qid);

        self.context.stats_mut().enumerators += 1;
        self.state = EnumState::Ready;
        self.step_counter = 0;
        self.permutations.clear();
        self.disabled.clear();
        self.change_prefix = 0;

        let num_variables = quantifier.num_variables();
        if num_variables == 0 || quantifier.is_trivially_true() {
            self.exhaust_at_init();
            return;
        }

        let phase = self.context.registry().current_phase(qid);
        let mut any_new = false;
        let mut sizes = Vec::with_capacity(num_variables);
        for variable in 0..num_variables {
            let size = self.source.prepare_terms(quantifier, variable);
            tracing::trace!(
                target: "inst_alg_rd",
                "Variable {} has {} candidates ({})",
                variable,
                size,
                self.source.kind()
            );
            if size == 0 && !self.full_effort {
                self.exhaust_at_init();
                return;
            }

            let candidates: Vec<TermId> = (0..size)
                .map(|rank| self.source.term(quantifier, variable, rank))
                .collect();
            {
                let mut registry = self.context.registry_mut();
                for &term in &candidates {
                    any_new |= registry.register_term(qid, term, phase);
                    registry.register_candidate(qid, variable, term);
                }
                if let Some(rd) = self.services.relevant_domain {
                    for &term in rd.terms(qid, variable) {
                        registry.mark_relevant(qid, term);
                    }
                }
            }
            let permutation =
                self.context
                    .rank_candidates(qid, variable, &candidates, self.services);
            self.permutations.push(permutation);
            sizes.push(size);
        }

        self.cursor = Cursor::new(self.context.config().staging, sizes);
        tracing::trace!(
            target: "inst_alg_rd",
            "Will do {} stages of instantiation",
            self.cursor.stage_count()
        );
        if any_new {
            self.context.registry_mut().advance_phase(qid);
        }
    }

    fn exhaust_at_init(&mut self) {
        self.state = EnumState::Exhausted;
        self.context.stats_mut().trivially_exhausted += 1;
        tracing::debug!(
            target: "inst_alg",
            "Nothing to enumerate for {}",
            self.quantifier.id()
        );
    }

    /// Whether another tuple is available; advances to it
    ///
    /// The first call after [`Self::init`] offers the all-zero tuple.
    pub fn has_next(&mut self) -> bool {
        match self.state {
            EnumState::Uninitialized => panic!("has_next called before init"),
            EnumState::Exhausted => return false,
            EnumState::Ready => {}
        }
        self.step_counter += 1;
        if self.step_counter == 1 {
            tracing::trace!(target: "inst_alg_rd", "Try stage 0...");
            return true;
        }
        if self.next_combination() {
            return true;
        }
        tracing::debug!(
            target: "inst_alg",
            "Enumeration of {} exhausted after {} steps",
            self.quantifier.id(),
            self.step_counter - 1
        );
        self.state = EnumState::Exhausted;
        false
    }

    /// Next raw combination that no recorded failure generalizes
    fn next_combination(&mut self) -> bool {
        loop {
            if !self.cursor.step() {
                if !self.cursor.increase_stage() {
                    return false;
                }
                self.context.stats_mut().stage_increases += 1;
                tracing::trace!(
                    target: "inst_alg_rd",
                    "Try stage {}...",
                    self.cursor.stage()
                );
            }
            if !self
                .disabled
                .find_prefix(self.cursor.indices(), self.change_prefix)
            {
                return true;
            }
            self.context.stats_mut().tuples_pruned += 1;
        }
    }

    /// Write the current tuple's terms into `terms`
    ///
    /// A variable without candidates yields `None`.
    pub fn next(&mut self, terms: &mut Vec<Option<TermId>>) {
        assert!(
            self.state == EnumState::Ready && self.step_counter > 0,
            "next requires a preceding successful has_next"
        );
        let quantifier = self.quantifier;
        let qid = quantifier.id();
        terms.clear();
        {
            let mut registry = self.context.registry_mut();
            for (variable, &index) in self.cursor.indices().iter().enumerate() {
                let term = (self.cursor.sizes()[variable] > 0).then(|| {
                    let rank = self.permutations[variable][index];
                    self.source.term(quantifier, variable, rank)
                });
                if let Some(term) = term {
                    registry.mark_tried(qid, term);
                }
                terms.push(term);
            }
        }
        self.context.stats_mut().tuples_produced += 1;
        tracing::trace!(
            target: "inst_alg_rd",
            "Try instantiation {:?}: {}",
            self.cursor.indices(),
            DisplayTerms(terms.as_slice())
        );
    }

    /// Record that the current tuple failed because of the positions set in
    /// `mask`
    pub fn failure_reason(&mut self, mask: &[bool]) {
        assert_eq!(
            mask.len(),
            self.quantifier.num_variables(),
            "failure mask must have one entry per variable"
        );
        assert!(
            self.state != EnumState::Uninitialized,
            "failure_reason called before init"
        );
        let indices = self.cursor.indices();
        tracing::debug!(
            target: "inst_alg",
            "Failure reason {}",
            DisplayMasked { mask, indices }
        );
        self.disabled.add(mask, indices);
        if let Some(last) = mask.iter().rposition(|&fixed| fixed) {
            self.change_prefix = self.change_prefix.max(last + 1);
        }
        self.context.stats_mut().failures_recorded += 1;
    }

    /// Current lifecycle state
    pub fn state(&self) -> EnumState {
        self.state
    }

    /// Index tuple of the current combination
    pub fn current_indices(&self) -> &[usize] {
        self.cursor.indices()
    }

    /// Candidate count of each variable
    pub fn candidate_counts(&self) -> &[usize] {
        self.cursor.sizes()
    }

    /// Number of max stages
    pub fn stage_count(&self) -> usize {
        self.cursor.stage_count()
    }

    /// Current stage (largest index or index sum)
    pub fn stage(&self) -> usize {
        self.cursor.stage()
    }

    /// Rank-to-discovery-index permutation of a variable
    pub fn permutation(&self, variable: usize) -> &[usize] {
        &self.permutations[variable]
    }

    /// Whether variables without candidates are iterated
    pub fn is_full_effort(&self) -> bool {
        self.full_effort
    }
}

impl fmt::Debug for TermTupleEnumerator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TermTupleEnumerator")
            .field("quantifier", &self.quantifier.id())
            .field("source", &self.source.kind())
            .field("full_effort", &self.full_effort)
            .field("state", &self.state)
            .field("cursor", &self.cursor)
            .field("change_prefix", &self.change_prefix)
            .finish_non_exhaustive()
    }
}

struct DisplayTerms<'t>(&'t [Option<TermId>]);

impl fmt::Display for DisplayTerms<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for term in self.0 {
            match term {
                Some(term) => write!(f, "{term} ")?,
                None => write!(f, "null ")?,
            }
        }
        Ok(())
    }
}

struct DisplayMasked<'t> {
    mask: &'t [bool],
    indices: &'t [usize],
}

impl fmt::Display for DisplayMasked<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ ")?;
        for (&fixed, index) in self.mask.iter().zip(self.indices) {
            if fixed {
                write!(f, "{index} ")?;
            } else {
                write!(f, "_ ")?;
            }
        }
        write!(f, "]")
    }
}
