//! Terms, quantifiers and the solver services the engine consumes
//!
//! The engine never inspects terms: it only moves opaque handles between the
//! ground-term database, the relevant domain and its caller.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Opaque handle of a ground term
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TermId(u32);

impl TermId {
    /// Create from a raw handle
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw handle
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Opaque handle of a sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SortId(u32);

impl SortId {
    /// Create from a raw handle
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw handle
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Opaque handle of a quantified formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuantifierId(u32);

impl QuantifierId {
    /// Create from a raw handle
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw handle
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for QuantifierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// A universally quantified formula as seen by the enumerator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantifier {
    id: QuantifierId,
    /// Sort of each bound variable, in binding order
    variables: SmallVec<[SortId; 4]>,
    /// The body was rewritten to the constant `true`
    trivially_true: bool,
}

impl Quantifier {
    /// Create a quantifier binding variables of the given sorts
    pub fn new(id: QuantifierId, variables: impl IntoIterator<Item = SortId>) -> Self {
        Self {
            id,
            variables: variables.into_iter().collect(),
            trivially_true: false,
        }
    }

    /// Mark the body as the constant `true`
    pub fn with_true_body(mut self) -> Self {
        self.trivially_true = true;
        self
    }

    /// Get the handle
    pub fn id(&self) -> QuantifierId {
        self.id
    }

    /// Number of bound variables
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Sort of the given bound variable
    pub fn variable_sort(&self, variable: usize) -> SortId {
        self.variables[variable]
    }

    /// Sorts of all bound variables
    pub fn variable_sorts(&self) -> &[SortId] {
        &self.variables
    }

    /// Whether the body is the constant `true`
    pub fn is_trivially_true(&self) -> bool {
        self.trivially_true
    }
}

/// Ground-term database and equality information of the solver
pub trait TermDatabase {
    /// Number of ground terms of a sort
    fn num_ground_terms(&self, sort: SortId) -> usize;

    /// The `index`-th ground term of a sort, in discovery order
    fn ground_term(&self, sort: SortId, index: usize) -> TermId;

    /// Representative of the term's equivalence class
    fn representative(&self, term: TermId) -> TermId;

    /// Whether the term contains an instantiation placeholder constant
    fn has_inst_constant(&self, term: TermId) -> bool;

    /// Depth of the term
    fn term_depth(&self, term: TermId) -> usize;
}

/// Precomputed per-variable candidate sets
pub trait RelevantDomain {
    /// Recompute the domains from the current solver state
    fn compute(&mut self) {}

    /// Relevant terms of a quantifier's variable, in discovery order
    fn terms(&self, quantifier: QuantifierId, variable: usize) -> &[TermId];
}

/// The read-only services an enumerator consults
#[derive(Clone, Copy)]
pub struct TermServices<'a> {
    /// Ground-term database
    pub db: &'a dyn TermDatabase,
    /// Relevant domain, when it has been computed
    pub relevant_domain: Option<&'a dyn RelevantDomain>,
}

impl<'a> TermServices<'a> {
    /// Services without a relevant domain
    pub fn new(db: &'a dyn TermDatabase) -> Self {
        Self {
            db,
            relevant_domain: None,
        }
    }

    /// Attach a relevant domain
    pub fn with_relevant_domain(mut self, relevant_domain: &'a dyn RelevantDomain) -> Self {
        self.relevant_domain = Some(relevant_domain);
        self
    }
}

impl fmt::Debug for TermServices<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TermServices")
            .field("relevant_domain", &self.relevant_domain.is_some())
            .finish_non_exhaustive()
    }
}
