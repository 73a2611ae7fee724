//! Subsumption trie of index tuples
//!
//! Stores masked tuples of candidate indices: a `true` mask position fixes
//! the index at that position, a `false` one is a wildcard. A stored entry
//! generalizes every tuple that agrees with it on the fixed positions, which
//! lets the enumerator skip tuples known to fail for the same reason.
//!
//! Paths descend one tuple position per level. A fixed position follows the
//! edge labelled with its index; a wildcard follows the node's single blank
//! edge. Once an entry's last fixed position has been consumed, the rest of
//! the path matches everything and is represented by an `Everything` node,
//! which also absorbs any more specific entries that were stored below it.

use smallvec::SmallVec;

/// A subtree of the trie
#[derive(Debug)]
enum Subtrie {
    /// Matches every remaining suffix
    Everything,
    /// Matches the suffixes stored below the node
    Branch(Box<TrieNode>),
}

impl Subtrie {
    fn empty() -> Self {
        Subtrie::Branch(Box::default())
    }
}

#[derive(Debug, Default)]
struct TrieNode {
    /// Edges for fixed positions, in insertion order
    children: SmallVec<[(usize, Subtrie); 2]>,
    /// Edge for a wildcard position
    blank: Option<Subtrie>,
}

/// Trie of masked index tuples
#[derive(Debug)]
pub struct IndexTrie {
    root: Subtrie,
    /// Skip entries without wildcards
    ignore_fully_specified: bool,
    /// Number of entries that changed the trie
    entries: usize,
}

impl Default for IndexTrie {
    fn default() -> Self {
        Self::new(false)
    }
}

impl IndexTrie {
    /// Create an empty trie
    pub fn new(ignore_fully_specified: bool) -> Self {
        Self {
            root: Subtrie::empty(),
            ignore_fully_specified,
            entries: 0,
        }
    }

    /// Whether nothing has been stored
    pub fn is_empty(&self) -> bool {
        match &self.root {
            Subtrie::Everything => false,
            Subtrie::Branch(node) => node.children.is_empty() && node.blank.is_none(),
        }
    }

    /// Number of entries that changed the trie
    pub fn len(&self) -> usize {
        self.entries
    }

    /// Whether every tuple is generalized by some entry
    pub fn matches_everything(&self) -> bool {
        matches!(self.root, Subtrie::Everything)
    }

    /// Store the masked tuple `(mask, values)`
    ///
    /// `values` at wildcard positions are ignored. Entries already generalized
    /// by a stored entry are not added.
    pub fn add(&mut self, mask: &[bool], values: &[usize]) {
        assert_eq!(
            mask.len(),
            values.len(),
            "mask and value tuple must have the same length"
        );
        let cardinality = mask.iter().filter(|&&fixed| fixed).count();
        if self.ignore_fully_specified && cardinality == mask.len() {
            return;
        }
        if Self::generalized_rec(&self.root, 0, mask, values) {
            return;
        }
        Self::add_rec(&mut self.root, 0, cardinality, mask, values);
        self.entries += 1;
    }

    /// Whether some stored entry generalizes `values`
    pub fn find(&self, values: &[usize]) -> bool {
        self.find_prefix(values, values.len())
    }

    /// Whether some stored entry generalizes `values`, checking only the first
    /// `prefix_len` positions
    ///
    /// Exact as long as no stored entry fixes a position at or beyond
    /// `prefix_len`.
    pub fn find_prefix(&self, values: &[usize], prefix_len: usize) -> bool {
        if self.is_empty() {
            return false;
        }
        let prefix = &values[..prefix_len.min(values.len())];
        Self::find_rec(&self.root, 0, prefix)
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.root = Subtrie::empty();
        self.entries = 0;
    }

    fn add_rec(
        subtrie: &mut Subtrie,
        index: usize,
        cardinality: usize,
        mask: &[bool],
        values: &[usize],
    ) {
        if cardinality == 0 {
            // Only wildcards remain: everything below matches.
            *subtrie = Subtrie::Everything;
            return;
        }
        let Subtrie::Branch(node) = subtrie else {
            return;
        };
        debug_assert!(index < mask.len());

        if !mask[index] {
            let blank = node.blank.get_or_insert_with(Subtrie::empty);
            Self::add_rec(blank, index + 1, cardinality, mask, values);
            return;
        }

        let value = values[index];
        let slot = match node.children.iter().position(|(v, _)| *v == value) {
            Some(slot) => slot,
            None => {
                node.children.push((value, Subtrie::empty()));
                node.children.len() - 1
            }
        };
        Self::add_rec(
            &mut node.children[slot].1,
            index + 1,
            cardinality - 1,
            mask,
            values,
        );
    }

    fn find_rec(subtrie: &Subtrie, index: usize, values: &[usize]) -> bool {
        let node = match subtrie {
            Subtrie::Everything => return true,
            Subtrie::Branch(node) => node,
        };
        if index >= values.len() {
            return true;
        }
        if node
            .blank
            .as_ref()
            .is_some_and(|blank| Self::find_rec(blank, index + 1, values))
        {
            return true;
        }
        node.children
            .iter()
            .any(|(v, child)| *v == values[index] && Self::find_rec(child, index + 1, values))
    }

    /// Whether a stored entry generalizes every tuple matching `(mask, values)`
    ///
    /// A wildcard position can only be covered by a blank edge, a fixed one by
    /// a blank edge or the edge with the same index.
    fn generalized_rec(subtrie: &Subtrie, index: usize, mask: &[bool], values: &[usize]) -> bool {
        let node = match subtrie {
            Subtrie::Everything => return true,
            Subtrie::Branch(node) => node,
        };
        if index >= mask.len() {
            return false;
        }
        if node
            .blank
            .as_ref()
            .is_some_and(|blank| Self::generalized_rec(blank, index + 1, mask, values))
        {
            return true;
        }
        mask[index]
            && node.children.iter().any(|(v, child)| {
                *v == values[index] && Self::generalized_rec(child, index + 1, mask, values)
            })
    }
}
