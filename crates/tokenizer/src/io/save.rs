//! Save functionality for trained tokenizers.

use super::format::{
    SerializedConfig, SerializedMerge, SerializedSpecialToken, SerializedToken,
    SerializedTokenizer, TOKENIZER_FILE,
};
use crate::tokenizer::TokenizerConfig;
use akshar_core::{
    Result, SpecialTokenKind, TokenKind, TokenizerError, Vocabulary, WORD_BOUNDARY,
};
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Tokenizer saver - writes a trained model.
pub struct TokenizerSaver<'a> {
    /// Vocabulary reference
    vocab: &'a Vocabulary,
    /// Configuration stored next to the vocabulary
    config: &'a TokenizerConfig,
}

impl<'a> TokenizerSaver<'a> {
    /// Create a new tokenizer saver.
    pub fn new(vocab: &'a Vocabulary, config: &'a TokenizerConfig) -> Self {
        Self { vocab, config }
    }

    /// Save the tokenizer to a directory as `tokenizer.json`.
    ///
    /// The directory is created if needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path).map_err(|e| TokenizerError::io(path, e))?;

        let file_path = path.join(TOKENIZER_FILE);
        let file = File::create(&file_path).map_err(|e| TokenizerError::io(&file_path, e))?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.serialize())
            .map_err(|e| TokenizerError::Save(format!("failed to serialize tokenizer: {e}")))?;
        writer
            .flush()
            .map_err(|e| TokenizerError::io(&file_path, e))?;

        info!(
            "saved tokenizer ({} tokens, {} merges) to {}",
            self.vocab.len(),
            self.vocab.merge_rules().len(),
            file_path.display()
        );
        Ok(())
    }

    /// Serialize to a pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.serialize())
            .map_err(|e| TokenizerError::Save(format!("failed to serialize tokenizer: {e}")))
    }

    /// Serialize the tokenizer to a structure.
    pub fn serialize(&self) -> SerializedTokenizer {
        let special = self.vocab.special_config();
        let mut special_tokens: Vec<SerializedSpecialToken> = SpecialTokenKind::ALL
            .iter()
            .map(|&kind| SerializedSpecialToken {
                kind,
                id: self.vocab.special_token_id(kind),
                text: special.text(kind).to_string(),
            })
            .collect();
        special_tokens.sort_by_key(|t| t.id);

        let tokens = self
            .vocab
            .iter()
            .map(|(id, entry)| match entry.kind {
                TokenKind::Merged((left, right)) => SerializedToken::Merge { id, left, right },
                _ => SerializedToken::Leaf {
                    id,
                    text: entry.text.to_string(),
                },
            })
            .collect();

        let merges = self
            .vocab
            .merge_rules()
            .iter()
            .enumerate()
            .map(|(rank, rule)| SerializedMerge {
                rank: rank as u32,
                left: rule.pair.0,
                right: rule.pair.1,
                result: rule.result,
            })
            .collect();

        SerializedTokenizer {
            version: env!("CARGO_PKG_VERSION").to_string(),
            boundary_marker: WORD_BOUNDARY.to_string(),
            special_tokens,
            tokens,
            merges,
            config: SerializedConfig {
                max_vocab_size: self.config.training.max_vocab_size,
                min_pair_frequency: self.config.training.min_pair_frequency,
                wrap_with_bos_eos: self.config.wrap_with_bos_eos,
                normalization: self.config.normalization,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use akshar_core::{SpecialTokensConfig, VocabularyBuilder};

    #[test]
    fn test_serialize() {
        let mut b = VocabularyBuilder::new(&SpecialTokensConfig::default()).unwrap();
        let ka = b.add_symbol("क").unwrap();
        let word = b.add_merge((4, ka)).unwrap();
        let vocab = b.build();
        let config = TokenizerConfig::default();

        let serialized = TokenizerSaver::new(&vocab, &config).serialize();

        assert_eq!(serialized.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(serialized.boundary_marker, "▁");
        assert_eq!(serialized.tokens.len(), 7);
        assert_eq!(
            serialized.tokens[6],
            SerializedToken::Merge {
                id: word,
                left: 4,
                right: ka
            }
        );
        assert_eq!(
            serialized.merges,
            vec![SerializedMerge {
                rank: 0,
                left: 4,
                right: ka,
                result: word
            }]
        );
        assert_eq!(serialized.special_tokens[1].kind, SpecialTokenKind::Unk);
        assert_eq!(serialized.special_tokens[1].text, "<UNK>");
        assert_eq!(serialized.config.max_vocab_size, 4_999);
    }

    #[test]
    fn test_save_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let model_dir = dir.path().join("nested").join("model");
        let vocab = Vocabulary::reserved(&SpecialTokensConfig::default()).unwrap();
        let config = TokenizerConfig::default();

        TokenizerSaver::new(&vocab, &config).save(&model_dir).unwrap();
        assert!(model_dir.join(TOKENIZER_FILE).is_file());
    }
}
