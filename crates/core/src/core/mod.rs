//! Core BPE data structures.
//!
//! This module contains the segmentation rule, merge rules, the pair
//! priority queue and the vocabulary, independent of training or any outer
//! API.

pub mod merges;
pub mod priority;
pub mod segment;
pub mod vocab;

pub use merges::{merge_pair_in_place, MergeMap, MergeRule, MergeRules, Pair, TokenId};
pub use priority::{MergeCandidate, PairPriorityQueue};
pub use segment::WORD_BOUNDARY;
pub use vocab::{
    SpecialTokenKind, SpecialTokens, SpecialTokensConfig, TokenEntry, TokenKind, TokenSpec,
    Vocab, Vocabulary, VocabularyBuilder,
};
