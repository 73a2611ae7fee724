//! Shared enumeration context
//!
//! One context lives for a solving session and is shared by reference between
//! every enumerator of that session. It owns:
//! - The configuration
//! - The candidate ranker (scoring model or local shuffle)
//! - The term registry feeding the ranking features
//! - The statistics
//!
//! Enumerators run one at a time, so the mutable parts sit behind `RefCell`s.

use std::cell::{Ref, RefCell, RefMut};
use std::time::Instant;

use oxiz_ml::{
    LocalShuffle, ScoringModel, TERM_FEATURE_SIZE, TermFeatures, load_model, ranked_permutation,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::FxHashSet;

use crate::config::{EnumConfig, RankingConfig};
use crate::error::{InstError, Result};
use crate::registry::TermRegistry;
use crate::stats::EnumStats;
use crate::term::{QuantifierId, TermId, TermServices};

#[derive(Debug)]
enum Ranker {
    Identity,
    Model(Box<dyn ScoringModel>),
    LocalShuffle { shuffle: LocalShuffle, seed: u64 },
}

/// Context shared by the enumerators of one solving session
#[derive(Debug)]
pub struct EnumContext {
    config: EnumConfig,
    ranker: Ranker,
    registry: RefCell<TermRegistry>,
    stats: RefCell<EnumStats>,
}

impl Default for EnumContext {
    fn default() -> Self {
        Self::from_parts(EnumConfig::default(), Ranker::Identity)
    }
}

impl EnumContext {
    /// Create a context, loading the configured ranking model
    pub fn new(config: EnumConfig) -> Result<Self> {
        let ranker = match &config.ranking {
            RankingConfig::None => Ranker::Identity,
            RankingConfig::Model { kind, path } => {
                if path.as_os_str().is_empty() {
                    return Err(InstError::InvalidConfig(format!(
                        "{kind} ranking needs a model file"
                    )));
                }
                Ranker::Model(check_features(load_model(*kind, path)?)?)
            }
            RankingConfig::LocalShuffle {
                swap_probability,
                extend_probability,
                seed,
            } => Ranker::LocalShuffle {
                shuffle: LocalShuffle::new(*swap_probability, *extend_probability)?,
                seed: *seed,
            },
        };
        Ok(Self::from_parts(config, ranker))
    }

    /// Create a context ranking candidates with an already built model
    pub fn with_model(config: EnumConfig, model: Box<dyn ScoringModel>) -> Result<Self> {
        Ok(Self::from_parts(config, Ranker::Model(check_features(model)?)))
    }

    fn from_parts(config: EnumConfig, ranker: Ranker) -> Self {
        Self {
            config,
            ranker,
            registry: RefCell::new(TermRegistry::new()),
            stats: RefCell::new(EnumStats::new()),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &EnumConfig {
        &self.config
    }

    /// Whether candidates are reordered before enumeration
    pub fn has_ranking(&self) -> bool {
        !matches!(self.ranker, Ranker::Identity)
    }

    /// Borrow the term registry
    pub fn registry(&self) -> Ref<'_, TermRegistry> {
        self.registry.borrow()
    }

    pub(crate) fn registry_mut(&self) -> RefMut<'_, TermRegistry> {
        self.registry.borrow_mut()
    }

    /// Snapshot of the statistics
    pub fn stats(&self) -> EnumStats {
        self.stats.borrow().clone()
    }

    pub(crate) fn stats_mut(&self) -> RefMut<'_, EnumStats> {
        self.stats.borrow_mut()
    }

    /// Forget all registered terms, e.g. between satisfiability checks
    pub fn reset(&self) {
        self.registry.borrow_mut().clear();
    }

    /// Permutation of a variable's candidates, mapping rank to discovery index
    ///
    /// `candidates` must already be registered for the quantifier.
    pub(crate) fn rank_candidates(
        &self,
        quantifier: QuantifierId,
        variable: usize,
        candidates: &[TermId],
        services: TermServices<'_>,
    ) -> Vec<usize> {
        if candidates.is_empty() {
            return Vec::new();
        }
        let start = Instant::now();
        let permutation = match &self.ranker {
            Ranker::Identity => return (0..candidates.len()).collect(),
            Ranker::Model(model) => {
                self.score_candidates(model.as_ref(), quantifier, variable, candidates, services)
            }
            Ranker::LocalShuffle { shuffle, seed } => {
                let mut rng = StdRng::seed_from_u64(shuffle_seed(*seed, quantifier, variable));
                shuffle.permutation(candidates.len(), &mut rng)
            }
        };
        self.stats
            .borrow_mut()
            .ml
            .record_ranking_time(start.elapsed().as_micros() as u64);
        tracing::trace!(
            target: "inst_alg_rd",
            "Ranked order for {} variable {}: {:?}",
            quantifier,
            variable,
            permutation
        );
        permutation
    }

    fn score_candidates(
        &self,
        model: &dyn ScoringModel,
        quantifier: QuantifierId,
        variable: usize,
        candidates: &[TermId],
        services: TermServices<'_>,
    ) -> Vec<usize> {
        let relevant: FxHashSet<TermId> = services
            .relevant_domain
            .map(|rd| rd.terms(quantifier, variable).iter().copied().collect())
            .unwrap_or_default();
        let registry = self.registry.borrow();
        let mut stats = self.stats.borrow_mut();

        tracing::trace!(
            target: "inst_alg_rd",
            "Predicting terms for variable {} on [age, phase, relevant, depth]",
            variable
        );
        let scores: Vec<f64> = candidates
            .iter()
            .map(|&term| {
                let info = registry.info(quantifier, term).copied().unwrap_or_default();
                let features = TermFeatures::new(
                    info.age,
                    info.phase,
                    relevant.contains(&term),
                    services.db.term_depth(term),
                )
                .to_vector();
                let start = Instant::now();
                let score = model.predict(&features);
                stats
                    .ml
                    .record_prediction_time(start.elapsed().as_micros() as u64);
                tracing::trace!(
                    target: "inst_alg_rd",
                    "Prediction {} : {:?} : {}",
                    term,
                    features,
                    score
                );
                score
            })
            .collect();
        ranked_permutation(&scores)
    }
}

fn check_features(model: Box<dyn ScoringModel>) -> Result<Box<dyn ScoringModel>> {
    if model.num_features() != TERM_FEATURE_SIZE {
        return Err(InstError::FeatureCount {
            expected: TERM_FEATURE_SIZE,
            got: model.num_features(),
        });
    }
    Ok(model)
}

/// Per-variable seed, so every variable gets its own reproducible shuffle
fn shuffle_seed(seed: u64, quantifier: QuantifierId, variable: usize) -> u64 {
    let salt = (u64::from(quantifier.raw()) << 32) | (variable as u64 & 0xFFFF_FFFF);
    seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ salt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockDatabase, MockRelevantDomain};
    use oxiz_ml::{ModelError, SigmoidModel};

    /// Scores a candidate by its depth
    #[derive(Debug)]
    struct DepthScorer;

    impl ScoringModel for DepthScorer {
        fn num_features(&self) -> usize {
            4
        }

        fn predict(&self, features: &[f64]) -> f64 {
            features[3]
        }
    }

    /// Scores a candidate by relevance
    #[derive(Debug)]
    struct RelevanceScorer;

    impl ScoringModel for RelevanceScorer {
        fn num_features(&self) -> usize {
            4
        }

        fn predict(&self, features: &[f64]) -> f64 {
            features[2]
        }
    }

    const Q: QuantifierId = QuantifierId::new(0);

    fn terms(raw: &[u32]) -> Vec<TermId> {
        raw.iter().copied().map(TermId::new).collect()
    }

    #[test]
    fn test_default_context_does_not_rank() {
        let ctx = EnumContext::default();
        let db = MockDatabase::new();
        assert!(!ctx.has_ranking());
        assert_eq!(
            ctx.rank_candidates(Q, 0, &terms(&[4, 5, 6]), TermServices::new(&db)),
            vec![0, 1, 2]
        );
        assert_eq!(ctx.stats().ml.rankings, 0);
    }

    #[test]
    fn test_model_ranks_by_score() {
        let mut db = MockDatabase::new();
        db.set_depth(TermId::new(5), 3);
        db.set_depth(TermId::new(6), 1);
        let ctx = EnumContext::with_model(EnumConfig::default(), Box::new(DepthScorer)).unwrap();
        assert!(ctx.has_ranking());

        let candidates = terms(&[4, 5, 6]);
        let permutation = ctx.rank_candidates(Q, 0, &candidates, TermServices::new(&db));
        assert_eq!(permutation, vec![1, 2, 0]);

        let stats = ctx.stats();
        assert_eq!(stats.ml.rankings, 1);
        assert_eq!(stats.ml.predictions, 3);
    }

    #[test]
    fn test_relevance_feature_is_per_variable() {
        let db = MockDatabase::new();
        let mut rd = MockRelevantDomain::new();
        rd.set(Q, 0, terms(&[6]));
        rd.set(Q, 1, terms(&[4]));
        let services = TermServices::new(&db).with_relevant_domain(&rd);
        let ctx =
            EnumContext::with_model(EnumConfig::default(), Box::new(RelevanceScorer)).unwrap();

        let candidates = terms(&[4, 5, 6]);
        assert_eq!(ctx.rank_candidates(Q, 0, &candidates, services), vec![2, 0, 1]);
        assert_eq!(ctx.rank_candidates(Q, 1, &candidates, services), vec![0, 1, 2]);
    }

    #[test]
    fn test_feature_count_mismatch() {
        let model = SigmoidModel::from_coefficients(vec![0.0, 1.0, 2.0]).unwrap();
        let err = EnumContext::with_model(EnumConfig::default(), Box::new(model)).unwrap_err();
        assert_eq!(
            err,
            InstError::FeatureCount {
                expected: 4,
                got: 2
            }
        );
    }

    #[test]
    fn test_missing_model_file() {
        let config = EnumConfig {
            ranking: RankingConfig::Model {
                kind: oxiz_ml::ModelKind::Sigmoid,
                path: "/nonexistent/model.txt".into(),
            },
            ..EnumConfig::default()
        };
        assert!(matches!(
            EnumContext::new(config),
            Err(InstError::Model(ModelError::Io { .. }))
        ));
    }

    #[test]
    fn test_empty_model_path() {
        let config = EnumConfig {
            ranking: RankingConfig::Model {
                kind: oxiz_ml::ModelKind::TreeEnsemble,
                path: "".into(),
            },
            ..EnumConfig::default()
        };
        assert!(matches!(
            EnumContext::new(config),
            Err(InstError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_local_shuffle_validation() {
        let config = EnumConfig {
            ranking: RankingConfig::LocalShuffle {
                swap_probability: 0.5,
                extend_probability: 1.0,
                seed: 7,
            },
            ..EnumConfig::default()
        };
        assert!(matches!(
            EnumContext::new(config),
            Err(InstError::Model(ModelError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn test_local_shuffle_is_reproducible() {
        let config = EnumConfig {
            ranking: RankingConfig::LocalShuffle {
                swap_probability: 0.7,
                extend_probability: 0.5,
                seed: 42,
            },
            ..EnumConfig::default()
        };
        let first = EnumContext::new(config.clone()).unwrap();
        let second = EnumContext::new(config).unwrap();
        let db = MockDatabase::new();
        let candidates: Vec<TermId> = (0..20).map(TermId::new).collect();

        let a = first.rank_candidates(Q, 1, &candidates, TermServices::new(&db));
        let b = second.rank_candidates(Q, 1, &candidates, TermServices::new(&db));
        assert_eq!(a, b);

        let mut sorted = a.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_reset_clears_registry() {
        let ctx = EnumContext::default();
        ctx.registry_mut().register_term(Q, TermId::new(1), 0);
        assert_eq!(ctx.registry().num_terms(Q), 1);
        ctx.reset();
        assert_eq!(ctx.registry().num_terms(Q), 0);
    }
}
