//! In-memory solver services for unit tests

use rustc_hash::{FxHashMap, FxHashSet};

use crate::term::{QuantifierId, RelevantDomain, SortId, TermDatabase, TermId};

/// Ground terms listed per sort, with optional merges, depths and placeholders
#[derive(Debug, Default)]
pub(crate) struct MockDatabase {
    terms: FxHashMap<SortId, Vec<TermId>>,
    representatives: FxHashMap<TermId, TermId>,
    inst_constants: FxHashSet<TermId>,
    depths: FxHashMap<TermId, usize>,
    next_id: u32,
}

impl MockDatabase {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Database with `size` fresh terms for each listed sort
    pub(crate) fn with_sizes(sizes: &[(SortId, usize)]) -> Self {
        let mut db = Self::new();
        for &(sort, size) in sizes {
            for _ in 0..size {
                db.fresh_term(sort);
            }
        }
        db
    }

    /// Append a fresh term to a sort
    pub(crate) fn fresh_term(&mut self, sort: SortId) -> TermId {
        let term = TermId::new(self.next_id);
        self.next_id += 1;
        self.terms.entry(sort).or_default().push(term);
        term
    }

    pub(crate) fn merge(&mut self, term: TermId, representative: TermId) {
        self.representatives.insert(term, representative);
    }

    pub(crate) fn mark_inst_constant(&mut self, term: TermId) {
        self.inst_constants.insert(term);
    }

    pub(crate) fn set_depth(&mut self, term: TermId, depth: usize) {
        self.depths.insert(term, depth);
    }

    pub(crate) fn terms_of(&self, sort: SortId) -> &[TermId] {
        self.terms.get(&sort).map_or(&[][..], Vec::as_slice)
    }
}

impl TermDatabase for MockDatabase {
    fn num_ground_terms(&self, sort: SortId) -> usize {
        self.terms_of(sort).len()
    }

    fn ground_term(&self, sort: SortId, index: usize) -> TermId {
        self.terms_of(sort)[index]
    }

    fn representative(&self, term: TermId) -> TermId {
        self.representatives.get(&term).copied().unwrap_or(term)
    }

    fn has_inst_constant(&self, term: TermId) -> bool {
        self.inst_constants.contains(&term)
    }

    fn term_depth(&self, term: TermId) -> usize {
        self.depths.get(&term).copied().unwrap_or(0)
    }
}

/// Relevant domain given as explicit per-variable lists
#[derive(Debug, Default)]
pub(crate) struct MockRelevantDomain {
    domains: FxHashMap<(QuantifierId, usize), Vec<TermId>>,
    pub(crate) computed: usize,
}

impl MockRelevantDomain {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(&mut self, quantifier: QuantifierId, variable: usize, terms: Vec<TermId>) {
        self.domains.insert((quantifier, variable), terms);
    }
}

impl RelevantDomain for MockRelevantDomain {
    fn compute(&mut self) {
        self.computed += 1;
    }

    fn terms(&self, quantifier: QuantifierId, variable: usize) -> &[TermId] {
        self.domains
            .get(&(quantifier, variable))
            .map_or(&[][..], Vec::as_slice)
    }
}
