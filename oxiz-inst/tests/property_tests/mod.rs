//! Property-based tests for oxiz-inst
//!
//! This module contains property-based tests using proptest to verify the
//! subsumption trie and the staged enumeration order.

mod enumeration_properties;
mod trie_properties;
