//! Grapheme-level BPE codec.
//!
//! Encoding segments text exactly like training does, then replays the
//! learned merges in rank order inside each word. Decoding expands tokens back
//! to their leaf symbols and turns word boundary markers into spaces.

use crate::core::merges::{merge_pair_in_place, TokenId};
use crate::core::segment;
use crate::core::vocab::{SpecialTokenKind, TokenKind, Vocabulary};
use std::sync::Arc;

/// Encoder/decoder over a shared, read-only vocabulary.
///
/// Cloning is cheap and every method takes `&self`, so one codec can serve
/// many threads at once.
#[derive(Debug, Clone)]
pub struct Codec {
    vocab: Arc<Vocabulary>,
    wrap_with_bos_eos: bool,
}

impl Codec {
    /// Create a codec that does not add BOS/EOS.
    pub fn new(vocab: Arc<Vocabulary>) -> Self {
        Self {
            vocab,
            wrap_with_bos_eos: false,
        }
    }

    /// Set whether `encode` wraps its output in BOS ... EOS.
    pub fn with_bos_eos(mut self, wrap: bool) -> Self {
        self.wrap_with_bos_eos = wrap;
        self
    }

    /// The vocabulary this codec reads from.
    pub fn vocab(&self) -> &Arc<Vocabulary> {
        &self.vocab
    }

    /// Whether `encode` adds BOS/EOS.
    pub fn wraps_with_bos_eos(&self) -> bool {
        self.wrap_with_bos_eos
    }

    /// Encode text to token IDs, wrapping with BOS/EOS if configured.
    ///
    /// Empty or whitespace-only text gives an empty sequence, or just
    /// `[BOS, EOS]` when wrapping.
    pub fn encode(&self, text: &str) -> Vec<TokenId> {
        self.encode_with(text, self.wrap_with_bos_eos)
    }

    /// Encode text, choosing BOS/EOS wrapping for this call only.
    pub fn encode_with(&self, text: &str, wrap_with_bos_eos: bool) -> Vec<TokenId> {
        let mut ids = Vec::with_capacity(text.len() / 2 + 2);

        if wrap_with_bos_eos {
            ids.push(self.vocab.special_token_id(SpecialTokenKind::Bos));
        }
        for word in segment::words(text) {
            ids.extend(self.encode_word(word));
        }
        if wrap_with_bos_eos {
            ids.push(self.vocab.special_token_id(SpecialTokenKind::Eos));
        }

        ids
    }

    /// Encode a single whitespace-free word, including its leading marker.
    pub fn encode_word(&self, word: &str) -> Vec<TokenId> {
        let unk = self.vocab.special_token_id(SpecialTokenKind::Unk);

        let mut tokens = Vec::with_capacity(word.len() + 1);
        tokens.push(self.vocab.boundary_id());
        tokens.extend(
            segment::symbols(word).map(|symbol| self.vocab.symbol_id(symbol).unwrap_or(unk)),
        );

        // Rules can only create pairs that rank after themselves, so taking
        // the lowest-ranked pair each round replays training order exactly.
        let merges = self.vocab.merges();
        while let Some((_, rule)) = merges.best_in(&tokens) {
            merge_pair_in_place(&mut tokens, rule.pair, rule.result);
        }

        tokens
    }

    /// Decode token IDs back to text.
    ///
    /// PAD, BOS and EOS produce no text. UNK, and any id outside the
    /// vocabulary, produce the UNK placeholder. Every boundary marker becomes
    /// one space, except a marker that comes before any other output.
    pub fn decode(&self, ids: &[TokenId]) -> String {
        let unk_text = self
            .vocab
            .special_config()
            .text(SpecialTokenKind::Unk)
            .to_string();

        let mut text = String::with_capacity(ids.len() * 4);
        for &id in ids {
            match self.vocab.kind(id) {
                None | Some(TokenKind::Special(SpecialTokenKind::Unk)) => {
                    text.push_str(&unk_text);
                }
                Some(TokenKind::Special(_)) => {}
                Some(_) => {
                    for leaf in self.vocab.leaves(id) {
                        match self.vocab.kind(leaf) {
                            Some(TokenKind::Boundary) => {
                                if !text.is_empty() {
                                    text.push(' ');
                                }
                            }
                            _ => {
                                if let Some(symbol) = self.vocab.id_to_token(leaf) {
                                    text.push_str(symbol);
                                }
                            }
                        }
                    }
                }
            }
        }

        text
    }
}
