//! Property-based tests for staged enumeration
//!
//! Tests:
//! - Stage monotonicity under both staging policies
//! - Lexicographic order within a stage
//! - Termination after at most the product of the candidate counts
//! - Pruning soundness and completeness under recorded failures

use std::collections::HashSet;

use oxiz_inst::{
    CandidateSource, EnumConfig, EnumContext, Quantifier, QuantifierId, SortId, StagingPolicy,
    TermServices, TermTupleEnumerator,
};
use proptest::prelude::*;

use crate::common::MockTermDb;

/// Every index tuple of an enumerator over variables of the given sizes,
/// recording the failure masks chosen by `fail` along the way
fn enumerate(
    policy: StagingPolicy,
    sizes: &[usize],
    mut fail: impl FnMut(usize) -> Option<Vec<bool>>,
) -> (Vec<Vec<usize>>, Vec<(usize, Vec<bool>, Vec<usize>)>) {
    let db = MockTermDb::new(sizes);
    let config = EnumConfig {
        staging: policy,
        ..EnumConfig::default()
    };
    let ctx = EnumContext::new(config).unwrap();
    let q = Quantifier::new(
        QuantifierId::new(0),
        (0..sizes.len()).map(|s| SortId::new(s as u32)),
    );
    let mut enumerator = TermTupleEnumerator::new(
        &q,
        &ctx,
        CandidateSource::basic(&db),
        TermServices::new(&db),
        true,
    );
    enumerator.init();

    let mut tuples = Vec::new();
    let mut failures = Vec::new();
    let mut terms = Vec::new();
    while enumerator.has_next() {
        enumerator.next(&mut terms);
        let tuple = enumerator.current_indices().to_vec();
        if let Some(mask) = fail(tuples.len()) {
            enumerator.failure_reason(&mask);
            failures.push((tuples.len(), mask, tuple.clone()));
        }
        tuples.push(tuple);
    }
    (tuples, failures)
}

/// Every index tuple within the sizes, a variable without candidates fixed at 0
fn all_tuples(sizes: &[usize]) -> Vec<Vec<usize>> {
    sizes.iter().fold(vec![Vec::new()], |acc, &size| {
        acc.into_iter()
            .flat_map(|prefix| {
                (0..size.max(1)).map(move |i| {
                    let mut tuple = prefix.clone();
                    tuple.push(i);
                    tuple
                })
            })
            .collect()
    })
}

fn weight(policy: StagingPolicy, tuple: &[usize]) -> usize {
    match policy {
        StagingPolicy::Max => tuple.iter().copied().max().unwrap_or(0),
        StagingPolicy::Sum => tuple.iter().sum(),
    }
}

fn policy() -> impl Strategy<Value = StagingPolicy> {
    prop_oneof![Just(StagingPolicy::Max), Just(StagingPolicy::Sum)]
}

#[test]
fn scenario_two_variables_max() {
    let (tuples, _) = enumerate(StagingPolicy::Max, &[2, 3], |_| None);
    assert_eq!(
        tuples,
        vec![
            vec![0, 0],
            vec![0, 1],
            vec![1, 0],
            vec![1, 1],
            vec![0, 2],
            vec![1, 2],
        ]
    );
}

proptest! {
    /// Without failures every tuple appears once, ordered by stage weight and
    /// lexicographically within a stage
    #[test]
    fn stages_are_monotone_and_lexicographic(
        policy in policy(),
        sizes in prop::collection::vec(0usize..4, 1..4),
    ) {
        let (tuples, _) = enumerate(policy, &sizes, |_| None);

        let mut expected = all_tuples(&sizes);
        expected.sort_by(|a, b| weight(policy, a).cmp(&weight(policy, b)).then(a.cmp(b)));
        prop_assert_eq!(tuples, expected);
    }

    /// Recorded failures never let a generalized tuple through and never hide
    /// a tuple that no failure generalizes
    #[test]
    fn pruning_is_sound_and_complete(
        policy in policy(),
        sizes in prop::collection::vec(1usize..4, 1..4),
        choices in prop::collection::vec(prop::option::weighted(0.3, any::<u8>()), 64),
    ) {
        let len = sizes.len();
        let (tuples, failures) = enumerate(policy, &sizes, |k| {
            choices
                .get(k)
                .copied()
                .flatten()
                .map(|bits| (0..len).map(|i| bits & (1 << i) != 0).collect())
        });

        let generalized_before = |position: usize, tuple: &[usize]| {
            failures.iter().any(|(at, mask, values)| {
                *at < position
                    && mask.iter().any(|&fixed| !fixed)
                    && mask
                        .iter()
                        .zip(values)
                        .zip(tuple)
                        .all(|((&fixed, v), t)| !fixed || v == t)
            })
        };

        let produced: HashSet<&Vec<usize>> = tuples.iter().collect();
        prop_assert_eq!(produced.len(), tuples.len());
        for (position, tuple) in tuples.iter().enumerate() {
            prop_assert!(!generalized_before(position, tuple));
        }
        for tuple in all_tuples(&sizes) {
            if !produced.contains(&tuple) {
                prop_assert!(generalized_before(tuples.len(), &tuple));
            }
        }
        prop_assert!(tuples.len() <= sizes.iter().product::<usize>());
    }
}
