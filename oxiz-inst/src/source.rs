//! Candidate term sources
//!
//! A source lists, for each variable of a quantifier, the ground terms the
//! enumerator may substitute for it. Ranks index the stable discovery order;
//! any reordering happens one layer above, in the enumerator's permutations.
//!
//! - [`CandidateSource::Basic`]: every ground term of the variable's sort,
//!   one per equivalence class, memoized per sort
//! - [`CandidateSource::RelevantDomain`]: the precomputed relevant terms of
//!   the variable

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::term::{Quantifier, RelevantDomain, SortId, TermDatabase, TermId};

/// Which kind of source produced the candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// All ground terms of the sort
    Basic,
    /// Relevant domain of the variable
    RelevantDomain,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Basic => write!(f, "basic"),
            SourceKind::RelevantDomain => write!(f, "relevant-domain"),
        }
    }
}

/// Ground terms of each sort, deduplicated by representative
pub struct BasicSource<'a> {
    db: &'a dyn TermDatabase,
    by_sort: FxHashMap<SortId, Vec<TermId>>,
}

impl<'a> BasicSource<'a> {
    /// Create a source over the term database
    pub fn new(db: &'a dyn TermDatabase) -> Self {
        Self {
            db,
            by_sort: FxHashMap::default(),
        }
    }

    /// Collect the candidates of a sort, once
    pub fn prepare_sort(&mut self, sort: SortId) -> usize {
        let db = self.db;
        self.by_sort
            .entry(sort)
            .or_insert_with(|| {
                let mut seen = FxHashSet::default();
                let mut terms = Vec::new();
                for index in 0..db.num_ground_terms(sort) {
                    let term = db.ground_term(sort, index);
                    if db.has_inst_constant(term) {
                        continue;
                    }
                    if seen.insert(db.representative(term)) {
                        terms.push(term);
                    }
                }
                tracing::trace!(
                    target: "inst_alg_rd",
                    "Collected {} ground terms of sort {}",
                    terms.len(),
                    sort.raw()
                );
                terms
            })
            .len()
    }

    /// The `rank`-th candidate of a prepared sort
    pub fn term(&self, sort: SortId, rank: usize) -> TermId {
        let terms = self
            .by_sort
            .get(&sort)
            .map_or(&[][..], Vec::as_slice);
        assert!(
            rank < terms.len(),
            "rank {rank} out of range for {} candidates of an unprepared or smaller sort",
            terms.len()
        );
        terms[rank]
    }
}

impl fmt::Debug for BasicSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicSource")
            .field("by_sort", &self.by_sort)
            .finish_non_exhaustive()
    }
}

/// Precomputed relevant domain of each variable
pub struct RelevantDomainSource<'a> {
    rd: &'a dyn RelevantDomain,
}

impl<'a> RelevantDomainSource<'a> {
    /// Create a source over a computed relevant domain
    pub fn new(rd: &'a dyn RelevantDomain) -> Self {
        Self { rd }
    }
}

impl fmt::Debug for RelevantDomainSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelevantDomainSource").finish_non_exhaustive()
    }
}

/// Candidate term source of one enumerator
#[derive(Debug)]
pub enum CandidateSource<'a> {
    /// All ground terms of the variable's sort
    Basic(BasicSource<'a>),
    /// Relevant domain of the variable
    RelevantDomain(RelevantDomainSource<'a>),
}

impl<'a> CandidateSource<'a> {
    /// Source over the ground-term database
    pub fn basic(db: &'a dyn TermDatabase) -> Self {
        CandidateSource::Basic(BasicSource::new(db))
    }

    /// Source over a computed relevant domain
    pub fn relevant_domain(rd: &'a dyn RelevantDomain) -> Self {
        CandidateSource::RelevantDomain(RelevantDomainSource::new(rd))
    }

    /// Which kind of source this is
    pub fn kind(&self) -> SourceKind {
        match self {
            CandidateSource::Basic(_) => SourceKind::Basic,
            CandidateSource::RelevantDomain(_) => SourceKind::RelevantDomain,
        }
    }

    /// Number of candidates for a variable; must precede [`Self::term`]
    pub fn prepare_terms(&mut self, quantifier: &Quantifier, variable: usize) -> usize {
        match self {
            CandidateSource::Basic(source) => {
                source.prepare_sort(quantifier.variable_sort(variable))
            }
            CandidateSource::RelevantDomain(source) => {
                source.rd.terms(quantifier.id(), variable).len()
            }
        }
    }

    /// The `rank`-th candidate of a variable, in discovery order
    pub fn term(&self, quantifier: &Quantifier, variable: usize, rank: usize) -> TermId {
        match self {
            CandidateSource::Basic(source) => {
                source.term(quantifier.variable_sort(variable), rank)
            }
            CandidateSource::RelevantDomain(source) => {
                let terms = source.rd.terms(quantifier.id(), variable);
                assert!(
                    rank < terms.len(),
                    "rank {rank} out of range for {} relevant terms",
                    terms.len()
                );
                terms[rank]
            }
        }
    }
}
