//! Term registry and phase tracking
//!
//! Per-quantifier bookkeeping of every candidate term the enumerators have
//! offered: when it was first seen, in which instantiation phase, whether it
//! was in a relevant domain and how often it was tried. These records are the
//! features of the ranking model.
//!
//! The registry also keeps a per-variable log of first sightings that can be
//! written out for offline analysis, for example to produce training data.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::term::{QuantifierId, TermDatabase, TermId};

/// What the registry knows about one candidate term of one quantifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TermInfo {
    /// Rank of first registration for the quantifier
    pub age: usize,
    /// Phase of the quantifier when the term was first registered
    pub phase: usize,
    /// Whether the term was seen in one of the quantifier's relevant domains
    pub relevant: bool,
    /// Number of tuples the term was offered in
    pub tried: usize,
}

#[derive(Debug, Default)]
struct QuantifierTerms {
    infos: FxHashMap<TermId, TermInfo>,
    current_phase: usize,
    /// Per variable: first-sighting index of each candidate
    candidates: Vec<FxHashMap<TermId, usize>>,
}

/// Registry of candidate terms, keyed by quantifier and term
#[derive(Debug, Default)]
pub struct TermRegistry {
    quantifiers: FxHashMap<QuantifierId, QuantifierTerms>,
}

impl TermRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a candidate term; returns whether it was new for the quantifier
    pub fn register_term(&mut self, quantifier: QuantifierId, term: TermId, phase: usize) -> bool {
        let entry = self.quantifiers.entry(quantifier).or_default();
        if entry.infos.contains_key(&term) {
            return false;
        }
        let age = entry.infos.len();
        entry.infos.insert(
            term,
            TermInfo {
                age,
                phase,
                ..TermInfo::default()
            },
        );
        true
    }

    /// Record that the term is in one of the quantifier's relevant domains
    pub fn mark_relevant(&mut self, quantifier: QuantifierId, term: TermId) {
        if let Some(info) = self.info_mut(quantifier, term) {
            info.relevant = true;
        }
    }

    /// Record that the term was offered in a tuple
    pub fn mark_tried(&mut self, quantifier: QuantifierId, term: TermId) {
        if let Some(info) = self.info_mut(quantifier, term) {
            info.tried += 1;
        }
    }

    /// Look up a term's record
    pub fn info(&self, quantifier: QuantifierId, term: TermId) -> Option<&TermInfo> {
        self.quantifiers.get(&quantifier)?.infos.get(&term)
    }

    fn info_mut(&mut self, quantifier: QuantifierId, term: TermId) -> Option<&mut TermInfo> {
        self.quantifiers.get_mut(&quantifier)?.infos.get_mut(&term)
    }

    /// Number of terms registered for the quantifier
    pub fn num_terms(&self, quantifier: QuantifierId) -> usize {
        self.quantifiers
            .get(&quantifier)
            .map_or(0, |entry| entry.infos.len())
    }

    /// Current phase of the quantifier (0 until advanced)
    pub fn current_phase(&self, quantifier: QuantifierId) -> usize {
        self.quantifiers
            .get(&quantifier)
            .map_or(0, |entry| entry.current_phase)
    }

    /// Move the quantifier to its next phase and return it
    pub fn advance_phase(&mut self, quantifier: QuantifierId) -> usize {
        let entry = self.quantifiers.entry(quantifier).or_default();
        entry.current_phase += 1;
        entry.current_phase
    }

    /// Log a candidate for one of the quantifier's variables; returns whether
    /// it was new for that variable
    pub fn register_candidate(
        &mut self,
        quantifier: QuantifierId,
        variable: usize,
        term: TermId,
    ) -> bool {
        let entry = self.quantifiers.entry(quantifier).or_default();
        if entry.candidates.len() <= variable {
            entry.candidates.resize_with(variable + 1, FxHashMap::default);
        }
        let seen = &mut entry.candidates[variable];
        if seen.contains_key(&term) {
            return false;
        }
        let index = seen.len();
        seen.insert(term, index);
        true
    }

    /// Candidates logged for a variable, in first-sighting order
    pub fn candidates(&self, quantifier: QuantifierId, variable: usize) -> Vec<TermId> {
        let Some(seen) = self
            .quantifiers
            .get(&quantifier)
            .and_then(|entry| entry.candidates.get(variable))
        else {
            return Vec::new();
        };
        let mut ordered: Vec<(usize, TermId)> =
            seen.iter().map(|(&term, &index)| (index, term)).collect();
        ordered.sort_unstable();
        ordered.into_iter().map(|(_, term)| term).collect()
    }

    /// Write the candidate log as S-expressions
    ///
    /// ```text
    /// (quantifier_candidates
    /// (candidates q0
    /// (variable 0 (age t3 0) (age t5 1) )
    /// )
    /// )
    /// (candidate_infos
    /// (candidate_info t3
    ///    (depth 1) )
    /// )
    /// ```
    pub fn write_candidates<W: fmt::Write>(
        &self,
        out: &mut W,
        db: &dyn TermDatabase,
    ) -> fmt::Result {
        let mut quantifiers: Vec<_> = self.quantifiers.keys().copied().collect();
        quantifiers.sort_unstable();
        let mut all_candidates = Vec::new();

        writeln!(out, "(quantifier_candidates ")?;
        for quantifier in &quantifiers {
            let entry = &self.quantifiers[quantifier];
            writeln!(out, "(candidates {quantifier} ")?;
            for variable in 0..entry.candidates.len() {
                write!(out, "(variable {variable} ")?;
                for (age, term) in self.candidates(*quantifier, variable).into_iter().enumerate() {
                    write!(out, "(age {term} {age}) ")?;
                    all_candidates.push(term);
                }
                writeln!(out, ")")?;
            }
            writeln!(out, ")")?;
        }
        writeln!(out, ")")?;

        all_candidates.sort_unstable();
        all_candidates.dedup();
        writeln!(out, "(candidate_infos ")?;
        for term in all_candidates {
            writeln!(out, "(candidate_info {term} ")?;
            writeln!(out, "   (depth {}) )", db.term_depth(term))?;
        }
        writeln!(out, ")")
    }

    /// Forget everything, e.g. between satisfiability checks
    pub fn clear(&mut self) {
        self.quantifiers.clear();
    }
}
