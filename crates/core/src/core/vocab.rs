//! Vocabulary storage and lookup.
//!
//! Token ids are dense and follow creation order. The four special tokens
//! come first, then the word boundary marker, then leaf symbols in order of
//! first appearance, then merged tokens in the order training created them.
//!
//! [`VocabularyBuilder`] is the only mutable form. Training and loading both
//! go through it, and [`VocabularyBuilder::build`] freezes the result into a
//! read-only [`Vocabulary`].

use crate::core::merges::{MergeRule, MergeRules, Pair, TokenId};
use crate::core::segment::WORD_BOUNDARY;
use crate::error::{Result, TokenizerError};
use ahash::{AHashMap, AHashSet};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Forward mapping: token string -> ID (first token created with that text)
pub type Vocab = AHashMap<CompactString, TokenId>;

/// The four reserved tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpecialTokenKind {
    Pad,
    Unk,
    Bos,
    Eos,
}

impl SpecialTokenKind {
    /// All kinds in the default id order.
    pub const ALL: [SpecialTokenKind; 4] = [Self::Pad, Self::Unk, Self::Bos, Self::Eos];

    /// Default placeholder text.
    pub fn default_text(self) -> &'static str {
        match self {
            Self::Pad => "<PAD>",
            Self::Unk => "<UNK>",
            Self::Bos => "<BOS>",
            Self::Eos => "<EOS>",
        }
    }
}

impl fmt::Display for SpecialTokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pad => "PAD",
            Self::Unk => "UNK",
            Self::Bos => "BOS",
            Self::Eos => "EOS",
        };
        f.write_str(name)
    }
}

/// Configuration for special tokens.
///
/// `order` decides the reserved ids: `order[0]` gets id 0, `order[1]` id 1,
/// and so on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialTokensConfig {
    pub pad: String,
    pub unk: String,
    pub bos: String,
    pub eos: String,
    pub order: [SpecialTokenKind; 4],
}

impl Default for SpecialTokensConfig {
    fn default() -> Self {
        Self {
            pad: SpecialTokenKind::Pad.default_text().to_string(),
            unk: SpecialTokenKind::Unk.default_text().to_string(),
            bos: SpecialTokenKind::Bos.default_text().to_string(),
            eos: SpecialTokenKind::Eos.default_text().to_string(),
            order: SpecialTokenKind::ALL,
        }
    }
}

impl SpecialTokensConfig {
    /// Placeholder text for a special token.
    pub fn text(&self, kind: SpecialTokenKind) -> &str {
        match kind {
            SpecialTokenKind::Pad => &self.pad,
            SpecialTokenKind::Unk => &self.unk,
            SpecialTokenKind::Bos => &self.bos,
            SpecialTokenKind::Eos => &self.eos,
        }
    }

    /// Check that the order is a permutation and the texts are usable.
    pub fn validate(&self) -> Result<()> {
        let kinds: AHashSet<SpecialTokenKind> = self.order.iter().copied().collect();
        if kinds.len() != SpecialTokenKind::ALL.len() {
            return Err(TokenizerError::InvalidConfig(format!(
                "special token order must list PAD, UNK, BOS and EOS exactly once, got {:?}",
                self.order
            )));
        }

        let mut texts = AHashSet::with_capacity(4);
        for kind in SpecialTokenKind::ALL {
            let text = self.text(kind);
            if text.is_empty() {
                return Err(TokenizerError::InvalidConfig(format!(
                    "{kind} token text must not be empty"
                )));
            }
            if text == WORD_BOUNDARY {
                return Err(TokenizerError::InvalidConfig(format!(
                    "{kind} token text collides with the word boundary marker"
                )));
            }
            if !texts.insert(text) {
                return Err(TokenizerError::InvalidConfig(format!(
                    "special token text {text:?} is used twice"
                )));
            }
        }
        Ok(())
    }
}

/// Special token IDs cached for fast access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialTokens {
    pub pad: TokenId,
    pub unk: TokenId,
    pub bos: TokenId,
    pub eos: TokenId,
}

impl SpecialTokens {
    /// Id of a special token.
    #[inline]
    pub fn id(&self, kind: SpecialTokenKind) -> TokenId {
        match kind {
            SpecialTokenKind::Pad => self.pad,
            SpecialTokenKind::Unk => self.unk,
            SpecialTokenKind::Bos => self.bos,
            SpecialTokenKind::Eos => self.eos,
        }
    }

    /// Check if an ID is a special token.
    #[inline]
    pub fn is_special(&self, id: TokenId) -> bool {
        id == self.pad || id == self.unk || id == self.bos || id == self.eos
    }
}

/// What a vocabulary entry is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Special(SpecialTokenKind),
    /// The word boundary marker
    Boundary,
    /// A leaf grapheme cluster
    Symbol,
    /// A token created by merging two earlier tokens
    Merged(Pair),
}

/// A vocabulary entry: the fully expanded text and how the token was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenEntry {
    pub text: CompactString,
    pub kind: TokenKind,
}

/// A non-reserved token given to [`Vocabulary::from_parts`], in id order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSpec {
    Symbol(String),
    Merge(Pair),
}

/// Mutable vocabulary used while training or loading.
#[derive(Debug, Clone)]
pub struct VocabularyBuilder {
    entries: Vec<TokenEntry>,
    vocab: Vocab,
    /// Leaf symbols only; a symbol may share its text with a special token
    symbols: Vocab,
    merges: MergeRules,
    special: SpecialTokens,
    special_config: SpecialTokensConfig,
    boundary: TokenId,
}

impl VocabularyBuilder {
    /// Start a vocabulary holding the special tokens and the boundary marker.
    pub fn new(special_config: &SpecialTokensConfig) -> Result<Self> {
        special_config.validate()?;

        let mut entries = Vec::with_capacity(SpecialTokenKind::ALL.len() + 1);
        let mut vocab = Vocab::new();
        let mut ids = [0 as TokenId; 4];

        for kind in special_config.order {
            let id = entries.len() as TokenId;
            let text = CompactString::new(special_config.text(kind));
            vocab.insert(text.clone(), id);
            entries.push(TokenEntry {
                text,
                kind: TokenKind::Special(kind),
            });
            ids[kind as usize] = id;
        }

        let boundary = entries.len() as TokenId;
        vocab.insert(CompactString::new(WORD_BOUNDARY), boundary);
        entries.push(TokenEntry {
            text: CompactString::new(WORD_BOUNDARY),
            kind: TokenKind::Boundary,
        });

        Ok(Self {
            entries,
            vocab,
            symbols: Vocab::new(),
            merges: MergeRules::new(),
            special: SpecialTokens {
                pad: ids[SpecialTokenKind::Pad as usize],
                unk: ids[SpecialTokenKind::Unk as usize],
                bos: ids[SpecialTokenKind::Bos as usize],
                eos: ids[SpecialTokenKind::Eos as usize],
            },
            special_config: special_config.clone(),
            boundary,
        })
    }

    /// Add a leaf symbol, returning its ID.
    ///
    /// Adding a symbol that already exists returns the existing ID. Symbols
    /// are keyed apart from special tokens, so a symbol whose text matches a
    /// special token's text still gets its own id.
    pub fn add_symbol(&mut self, text: &str) -> Result<TokenId> {
        if let Some(id) = self.symbol_id(text) {
            return Ok(id);
        }
        if text.is_empty() {
            return Err(TokenizerError::UnknownToken(
                "empty symbol text".to_string(),
            ));
        }
        if text == WORD_BOUNDARY {
            return Err(TokenizerError::UnknownToken(format!(
                "{text:?} is the word boundary marker"
            )));
        }

        let id = self.entries.len() as TokenId;
        let text = CompactString::new(text);
        self.symbols.insert(text.clone(), id);
        self.vocab.entry(text.clone()).or_insert(id);
        self.entries.push(TokenEntry {
            text,
            kind: TokenKind::Symbol,
        });
        Ok(id)
    }

    /// Create the token for `pair` and record the merge rule.
    pub fn add_merge(&mut self, pair: Pair) -> Result<TokenId> {
        let text = {
            let left = self.mergeable(pair.0)?;
            let right = self.mergeable(pair.1)?;
            let mut text = CompactString::with_capacity(left.len() + right.len());
            text.push_str(left);
            text.push_str(right);
            text
        };

        let id = self.entries.len() as TokenId;
        if self.merges.push(pair, id).is_none() {
            return Err(TokenizerError::InvalidMerge(format!(
                "pair ({}, {}) was already merged",
                pair.0, pair.1
            )));
        }

        self.vocab.entry(text.clone()).or_insert(id);
        self.entries.push(TokenEntry {
            text,
            kind: TokenKind::Merged(pair),
        });
        Ok(id)
    }

    fn mergeable(&self, id: TokenId) -> Result<&str> {
        let entry = self
            .entries
            .get(id as usize)
            .ok_or(TokenizerError::UnknownTokenId(id))?;
        if let TokenKind::Special(kind) = entry.kind {
            return Err(TokenizerError::InvalidMerge(format!(
                "special token {kind} cannot be merged"
            )));
        }
        Ok(entry.text.as_str())
    }

    /// ID of a leaf symbol.
    pub fn symbol_id(&self, text: &str) -> Option<TokenId> {
        self.symbols.get(text).copied()
    }

    /// Text of a token.
    pub fn token(&self, id: TokenId) -> Option<&str> {
        self.entries.get(id as usize).map(|e| e.text.as_str())
    }

    /// ID of the word boundary marker.
    pub fn boundary_id(&self) -> TokenId {
        self.boundary
    }

    /// Special token ids.
    pub fn special_tokens(&self) -> SpecialTokens {
        self.special
    }

    /// Current number of tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true: specials and the marker are always present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of merge rules recorded so far.
    pub fn merge_count(&self) -> usize {
        self.merges.len()
    }

    /// Freeze into an immutable vocabulary.
    pub fn build(self) -> Vocabulary {
        Vocabulary {
            entries: self.entries,
            vocab: self.vocab,
            symbols: self.symbols,
            merges: self.merges,
            special: self.special,
            special_config: self.special_config,
            boundary: self.boundary,
        }
    }
}

/// Trained vocabulary: token <-> id, ordered merge rules, special tokens.
///
/// Immutable; share it behind an `Arc` between codecs.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    entries: Vec<TokenEntry>,
    vocab: Vocab,
    symbols: Vocab,
    merges: MergeRules,
    special: SpecialTokens,
    special_config: SpecialTokensConfig,
    boundary: TokenId,
}

impl Vocabulary {
    /// Vocabulary with only the reserved tokens.
    pub fn reserved(special_config: &SpecialTokensConfig) -> Result<Self> {
        Ok(VocabularyBuilder::new(special_config)?.build())
    }

    /// Rebuild a vocabulary from its non-reserved tokens in id order.
    ///
    /// Every merge must reference tokens that already exist. This is the
    /// sanity check used when loading a persisted vocabulary.
    pub fn from_parts(
        special_config: &SpecialTokensConfig,
        tokens: impl IntoIterator<Item = TokenSpec>,
    ) -> Result<Self> {
        let mut builder = VocabularyBuilder::new(special_config)?;
        for spec in tokens {
            let expected = builder.len() as TokenId;
            let id = match spec {
                TokenSpec::Symbol(text) => builder.add_symbol(&text)?,
                TokenSpec::Merge(pair) => builder.add_merge(pair)?,
            };
            if id != expected {
                return Err(TokenizerError::InvalidMerge(format!(
                    "token {id} appears twice (expected new id {expected})"
                )));
            }
        }
        Ok(builder.build())
    }

    /// ID for a token text. Returns the first token created with that text.
    #[inline]
    pub fn token_to_id(&self, text: &str) -> Option<TokenId> {
        self.vocab.get(text).copied()
    }

    /// Fully expanded text of a token.
    #[inline]
    pub fn id_to_token(&self, id: TokenId) -> Option<&str> {
        self.entries.get(id as usize).map(|e| e.text.as_str())
    }

    /// ID of a leaf symbol. Merged, special and boundary texts return `None`.
    #[inline]
    pub fn symbol_id(&self, text: &str) -> Option<TokenId> {
        self.symbols.get(text).copied()
    }

    /// Merge rules in creation (priority) order.
    #[inline]
    pub fn merge_rules(&self) -> &[MergeRule] {
        self.merges.as_slice()
    }

    /// Merge rules with pair lookup.
    #[inline]
    pub fn merges(&self) -> &MergeRules {
        &self.merges
    }

    /// Rank of the merge rule for `pair`, if one was learned.
    #[inline]
    pub fn merge_rank(&self, pair: Pair) -> Option<u32> {
        self.merges.rank(pair)
    }

    /// Reserved id of a special token.
    #[inline]
    pub fn special_token_id(&self, kind: SpecialTokenKind) -> TokenId {
        self.special.id(kind)
    }

    /// All special token ids.
    #[inline]
    pub fn special_tokens(&self) -> SpecialTokens {
        self.special
    }

    /// Special token configuration the vocabulary was built with.
    pub fn special_config(&self) -> &SpecialTokensConfig {
        &self.special_config
    }

    /// ID of the word boundary marker.
    #[inline]
    pub fn boundary_id(&self) -> TokenId {
        self.boundary
    }

    /// Kind of a token.
    #[inline]
    pub fn kind(&self, id: TokenId) -> Option<TokenKind> {
        self.entries.get(id as usize).map(|e| e.kind)
    }

    /// Constituent pair of a merged token.
    #[inline]
    pub fn constituents(&self, id: TokenId) -> Option<Pair> {
        match self.kind(id)? {
            TokenKind::Merged(pair) => Some(pair),
            _ => None,
        }
    }

    /// Leaf tokens of `id`, left to right.
    ///
    /// Expansion uses an explicit stack, so long merge chains cannot overflow
    /// the call stack. Unknown ids yield nothing.
    pub fn leaves(&self, id: TokenId) -> Leaves<'_> {
        let stack = if (id as usize) < self.entries.len() {
            vec![id]
        } else {
            Vec::new()
        };
        Leaves { vocab: self, stack }
    }

    /// Get the size of the vocabulary.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the vocabulary is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (TokenId, &TokenEntry)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(id, entry)| (id as TokenId, entry))
    }
}

/// Iterator over the leaf tokens of a merged token.
pub struct Leaves<'a> {
    vocab: &'a Vocabulary,
    stack: Vec<TokenId>,
}

impl Iterator for Leaves<'_> {
    type Item = TokenId;

    fn next(&mut self) -> Option<TokenId> {
        while let Some(id) = self.stack.pop() {
            match self.vocab.entries[id as usize].kind {
                TokenKind::Merged((left, right)) => {
                    self.stack.push(right);
                    self.stack.push(left);
                }
                _ => return Some(id),
            }
        }
        None
    }
}
