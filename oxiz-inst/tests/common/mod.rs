//! Shared in-memory solver services for the integration tests

#![allow(dead_code)]

use std::collections::HashMap;

use oxiz_inst::{QuantifierId, RelevantDomain, SortId, TermDatabase, TermId};

/// Term database with `sizes[s]` distinct terms of sort `s`
#[derive(Debug, Default)]
pub struct MockTermDb {
    terms: Vec<Vec<TermId>>,
    depths: HashMap<TermId, usize>,
    representatives: HashMap<TermId, TermId>,
}

impl MockTermDb {
    pub fn new(sizes: &[usize]) -> Self {
        let mut next = 0;
        let terms: Vec<Vec<TermId>> = sizes
            .iter()
            .map(|&size| {
                let sort_terms: Vec<TermId> = (next..next + size as u32).map(TermId::new).collect();
                next += size as u32;
                sort_terms
            })
            .collect();
        Self {
            terms,
            ..Self::default()
        }
    }

    pub fn terms(&self, sort: SortId) -> &[TermId] {
        self.terms
            .get(sort.raw() as usize)
            .map_or(&[][..], Vec::as_slice)
    }

    pub fn set_depth(&mut self, term: TermId, depth: usize) {
        self.depths.insert(term, depth);
    }

    pub fn merge(&mut self, term: TermId, representative: TermId) {
        self.representatives.insert(term, representative);
    }
}

impl TermDatabase for MockTermDb {
    fn num_ground_terms(&self, sort: SortId) -> usize {
        self.terms(sort).len()
    }

    fn ground_term(&self, sort: SortId, index: usize) -> TermId {
        self.terms(sort)[index]
    }

    fn representative(&self, term: TermId) -> TermId {
        self.representatives.get(&term).copied().unwrap_or(term)
    }

    fn has_inst_constant(&self, _term: TermId) -> bool {
        false
    }

    fn term_depth(&self, term: TermId) -> usize {
        self.depths.get(&term).copied().unwrap_or(0)
    }
}

/// Relevant domain given as explicit per-variable lists
#[derive(Debug, Default)]
pub struct MockRelevantDomain {
    domains: HashMap<(QuantifierId, usize), Vec<TermId>>,
}

impl MockRelevantDomain {
    pub fn set(&mut self, quantifier: QuantifierId, variable: usize, terms: Vec<TermId>) {
        self.domains.insert((quantifier, variable), terms);
    }
}

impl RelevantDomain for MockRelevantDomain {
    fn terms(&self, quantifier: QuantifierId, variable: usize) -> &[TermId] {
        self.domains
            .get(&(quantifier, variable))
            .map_or(&[][..], Vec::as_slice)
    }
}
