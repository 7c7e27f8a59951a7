//! Akshar-core - Core data structures for grapheme-level BPE
//!
//! This crate holds everything training and tokenization share: the
//! vocabulary, ordered merge rules, the pair priority queue, grapheme-aware
//! segmentation, and the codec that turns text into token ids and back.
//!
//! # Features
//!
//! - Grapheme-cluster symbols, so Devanagari combining marks never split
//! - Dense token ids with reserved PAD/UNK/BOS/EOS and a word boundary marker
//! - Merge rules keyed by token-id pairs with rank lookup
//! - Deterministic priority queue for training
//! - Error handling with detailed diagnostics
//!
//! # Example
//!
//! ```rust
//! use akshar_core::{Codec, SpecialTokensConfig, VocabularyBuilder};
//! use std::sync::Arc;
//!
//! let mut builder = VocabularyBuilder::new(&SpecialTokensConfig::default()).unwrap();
//! let na = builder.add_symbol("न").unwrap();
//! let word = builder.add_merge((builder.boundary_id(), na)).unwrap();
//!
//! let codec = Codec::new(Arc::new(builder.build()));
//! assert_eq!(codec.encode("न"), vec![word]);
//! assert_eq!(codec.decode(&[word]), "न");
//! ```

pub mod error;
pub use error::{Result, TokenizerError};

// Core BPE data structures
pub mod core;
pub use core::{
    merge_pair_in_place, MergeCandidate, MergeMap, MergeRule, MergeRules, Pair,
    PairPriorityQueue, SpecialTokenKind, SpecialTokens, SpecialTokensConfig, TokenEntry,
    TokenId, TokenKind, TokenSpec, Vocab, Vocabulary, VocabularyBuilder, WORD_BOUNDARY,
};

// Text <-> ids
pub mod encoding;
pub use encoding::Codec;

pub mod metrics;
pub use metrics::{
    byte_compression_ratio, byte_compression_ratio_of, compression_ratio, compression_ratio_of,
};
