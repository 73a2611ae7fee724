//! OxiZ Inst - Enumerative Quantifier Instantiation
//!
//! This crate implements the term-tuple enumeration engine behind full
//! saturation (enumerative instantiation) of universally quantified formulas:
//! - Per-variable candidate terms from the ground-term database or from the
//!   relevant domain
//! - Staged enumeration of term tuples, smallest combinations first, bounded
//!   either by the largest index or by the index sum
//! - A subsumption trie of failed partial tuples used to skip combinations
//!   already known to be useless
//! - Optional learned ranking of each variable's candidates from historical
//!   usage features
//!
//! The term representation, congruence closure and relevant-domain
//! computation are consumed through the traits in [`term`].
//!
//! # Examples
//!
//! ```
//! use oxiz_inst::{
//!     CandidateSource, EnumContext, Quantifier, QuantifierId, SortId, TermDatabase, TermId,
//!     TermServices, TermTupleEnumerator,
//! };
//!
//! /// Three ground terms of a single sort, all distinct.
//! struct Ground;
//!
//! impl TermDatabase for Ground {
//!     fn num_ground_terms(&self, _sort: SortId) -> usize { 3 }
//!     fn ground_term(&self, _sort: SortId, index: usize) -> TermId { TermId::new(index as u32) }
//!     fn representative(&self, term: TermId) -> TermId { term }
//!     fn has_inst_constant(&self, _term: TermId) -> bool { false }
//!     fn term_depth(&self, _term: TermId) -> usize { 0 }
//! }
//!
//! let db = Ground;
//! let ctx = EnumContext::default();
//! let q = Quantifier::new(QuantifierId::new(0), [SortId::new(0), SortId::new(0)]);
//!
//! let mut enumerator = TermTupleEnumerator::new(
//!     &q,
//!     &ctx,
//!     CandidateSource::basic(&db),
//!     TermServices::new(&db),
//!     false,
//! );
//! enumerator.init();
//!
//! let mut terms = Vec::new();
//! let mut count = 0;
//! while enumerator.has_next() {
//!     enumerator.next(&mut terms);
//!     count += 1;
//! }
//! assert_eq!(count, 9);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod context;
pub mod enumerator;
pub mod error;
pub mod index_trie;
pub mod registry;
pub mod source;
pub mod stats;
pub mod strategy;
pub mod term;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{EnumConfig, RankingConfig, StagingPolicy, StrategyConfig};
pub use context::EnumContext;
pub use enumerator::{EnumState, TermTupleEnumerator};
pub use error::{InstError, Result};
pub use index_trie::IndexTrie;
pub use registry::{TermInfo, TermRegistry};
pub use source::{CandidateSource, SourceKind};
pub use stats::EnumStats;
pub use strategy::{
    EnumerativeStrategy, InstantiationOutcome, QuantEffort, QuantifierEngine, RoundSummary,
};
pub use term::{
    Quantifier, QuantifierId, RelevantDomain, SortId, TermDatabase, TermId, TermServices,
};
