//! Property-based tests for the subsumption trie
//!
//! Tests:
//! - Soundness of generalization
//! - Agreement with a brute-force matcher
//! - Exactness of prefix-restricted lookups
//! - Minimality of fully specified and fully wildcarded entries

use oxiz_inst::IndexTrie;
use proptest::prelude::*;

/// A masked tuple: `(mask, values)`
type Entry = (Vec<bool>, Vec<usize>);

fn entry(len: usize) -> impl Strategy<Value = Entry> {
    (
        prop::collection::vec(any::<bool>(), len),
        prop::collection::vec(0usize..3, len),
    )
}

fn generalizes((mask, values): &Entry, tuple: &[usize]) -> bool {
    mask.iter()
        .zip(values)
        .zip(tuple)
        .all(|((&fixed, v), t)| !fixed || v == t)
}

fn entries_and_queries() -> impl Strategy<Value = (Vec<Entry>, Vec<Vec<usize>>)> {
    (1usize..5).prop_flat_map(|len| {
        (
            prop::collection::vec(entry(len), 0..8),
            prop::collection::vec(prop::collection::vec(0usize..3, len), 1..16),
        )
    })
}

#[test]
fn scenario_wildcard_first_position() {
    let mut trie = IndexTrie::new(false);
    trie.add(&[false, true], &[0, 1]);
    assert!(trie.find(&[5, 1]));
    assert!(!trie.find(&[5, 0]));
}

proptest! {
    /// An added entry generalizes every tuple agreeing on its fixed positions
    #[test]
    fn added_entry_is_found(((mask, values), other) in (1usize..6).prop_flat_map(|len| {
        (entry(len), prop::collection::vec(0usize..3, len))
    })) {
        let mut trie = IndexTrie::new(false);
        trie.add(&mask, &values);
        prop_assert!(trie.find(&values));

        let agreeing: Vec<usize> = mask
            .iter()
            .zip(&values)
            .zip(&other)
            .map(|((&fixed, &v), &o)| if fixed { v } else { o })
            .collect();
        prop_assert!(trie.find(&agreeing));
    }

    /// `find` answers exactly what a brute-force scan of the entries answers
    #[test]
    fn find_matches_brute_force((entries, queries) in entries_and_queries()) {
        let mut trie = IndexTrie::new(false);
        for (mask, values) in &entries {
            trie.add(mask, values);
        }
        for query in &queries {
            let expected = entries.iter().any(|e| generalizes(e, query));
            prop_assert_eq!(trie.find(query), expected);
        }
    }

    /// Restricting the lookup to the positions some entry fixes loses nothing
    #[test]
    fn prefix_lookup_is_exact((entries, queries) in entries_and_queries()) {
        let mut trie = IndexTrie::new(false);
        let mut change_prefix = 0;
        for (mask, values) in &entries {
            trie.add(mask, values);
            if let Some(last) = mask.iter().rposition(|&fixed| fixed) {
                change_prefix = change_prefix.max(last + 1);
            }
        }
        for query in &queries {
            prop_assert_eq!(trie.find_prefix(query, change_prefix), trie.find(query));
        }
    }

    /// A fully specified entry matches its own tuple and nothing else
    #[test]
    fn fully_specified_entry_is_exact(
        (values, other) in (1usize..6).prop_flat_map(|len| {
            (prop::collection::vec(0usize..3, len), prop::collection::vec(0usize..3, len))
        })
    ) {
        let mut trie = IndexTrie::new(false);
        trie.add(&vec![true; values.len()], &values);
        prop_assert_eq!(trie.find(&other), other == values);
    }

    /// A fully wildcarded entry matches everything, whatever came before
    #[test]
    fn full_wildcard_matches_everything((entries, queries) in entries_and_queries()) {
        let len = queries[0].len();
        let mut trie = IndexTrie::new(false);
        for (mask, values) in &entries {
            trie.add(mask, values);
        }
        trie.add(&vec![false; len], &vec![0; len]);
        prop_assert!(trie.matches_everything());
        for query in &queries {
            prop_assert!(trie.find(query));
        }
    }
}
