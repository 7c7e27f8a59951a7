//! Format definitions for tokenizer serialization.
//!
//! A trained tokenizer is stored as a single `tokenizer.json`. Tokens are
//! listed in id order; a leaf carries its text and a merged token carries its
//! constituent ids, so the file can be rebuilt and checked without trusting
//! any derived text.

use crate::pre_tokenizer::NormalizationForm;
use akshar_core::{SpecialTokenKind, TokenId};
use serde::{Deserialize, Serialize};

/// File name inside a model directory.
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Complete tokenizer serialization format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedTokenizer {
    /// Crate version that wrote the file
    pub version: String,
    /// Word boundary marker text
    pub boundary_marker: String,
    /// Special tokens
    pub special_tokens: Vec<SerializedSpecialToken>,
    /// Every token, in id order
    pub tokens: Vec<SerializedToken>,
    /// Merge rules, in rank order
    pub merges: Vec<SerializedMerge>,
    /// Configuration
    pub config: SerializedConfig,
}

/// A reserved token and its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedSpecialToken {
    pub kind: SpecialTokenKind,
    pub id: TokenId,
    pub text: String,
}

/// One vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SerializedToken {
    /// Special token, boundary marker or grapheme symbol
    Leaf { id: TokenId, text: String },
    /// Token created by merging `left` and `right`
    Merge {
        id: TokenId,
        left: TokenId,
        right: TokenId,
    },
}

impl SerializedToken {
    /// Id of the entry.
    pub fn id(&self) -> TokenId {
        match self {
            Self::Leaf { id, .. } | Self::Merge { id, .. } => *id,
        }
    }
}

/// Merge rule for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedMerge {
    /// Priority; 0 is applied first
    pub rank: u32,
    pub left: TokenId,
    pub right: TokenId,
    /// Token created by this merge
    pub result: TokenId,
}

/// Tokenizer configuration in serialized format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedConfig {
    pub max_vocab_size: usize,
    pub min_pair_frequency: u64,
    pub wrap_with_bos_eos: bool,
    #[serde(default)]
    pub normalization: NormalizationForm,
}
