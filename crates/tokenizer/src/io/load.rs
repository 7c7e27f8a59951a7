//! Load functionality for trained tokenizers.
//!
//! Loading rebuilds the vocabulary through the same builder training uses,
//! so every merge is checked to reference tokens that already exist, and
//! the stored merge list must match the one implied by the tokens.

use super::format::{SerializedConfig, SerializedToken, SerializedTokenizer, TOKENIZER_FILE};
use akshar_core::{
    Result, SpecialTokenKind, SpecialTokensConfig, TokenSpec, TokenizerError, Vocabulary,
    WORD_BOUNDARY,
};
use log::{debug, info};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Tokenizer loader - reads trained models.
pub struct TokenizerLoader;

impl TokenizerLoader {
    /// Load `tokenizer.json` from a model directory.
    pub fn load(path: &Path) -> Result<(Vocabulary, SerializedConfig)> {
        let file_path = path.join(TOKENIZER_FILE);
        let file = File::open(&file_path).map_err(|e| TokenizerError::io(&file_path, e))?;

        let serialized: SerializedTokenizer = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| {
                TokenizerError::Load(format!("failed to parse {}: {e}", file_path.display()))
            })?;

        let loaded = Self::deserialize(serialized)?;
        info!(
            "loaded tokenizer ({} tokens, {} merges) from {}",
            loaded.0.len(),
            loaded.0.merge_rules().len(),
            file_path.display()
        );
        Ok(loaded)
    }

    /// Load from the contents of a `tokenizer.json`.
    pub fn from_json(json: &str) -> Result<(Vocabulary, SerializedConfig)> {
        let serialized: SerializedTokenizer = serde_json::from_str(json)
            .map_err(|e| TokenizerError::Load(format!("failed to parse tokenizer: {e}")))?;
        Self::deserialize(serialized)
    }

    /// Rebuild and validate a vocabulary from its serialized form.
    pub fn deserialize(data: SerializedTokenizer) -> Result<(Vocabulary, SerializedConfig)> {
        debug!("deserializing tokenizer written by version {}", data.version);

        if data.boundary_marker != WORD_BOUNDARY {
            return Err(TokenizerError::Load(format!(
                "unsupported boundary marker {:?}",
                data.boundary_marker
            )));
        }

        let special_config = Self::special_config(&data)?;
        let reserved = Vocabulary::reserved(&special_config)?;

        for (expected, token) in data.tokens.iter().enumerate() {
            if token.id() as usize != expected {
                return Err(TokenizerError::Load(format!(
                    "token ids must be dense and ordered: found {} at position {expected}",
                    token.id()
                )));
            }
        }
        if data.tokens.len() < reserved.len() {
            return Err(TokenizerError::Load(format!(
                "expected at least {} reserved tokens, found {}",
                reserved.len(),
                data.tokens.len()
            )));
        }

        let (head, tail) = data.tokens.split_at(reserved.len());
        for token in head {
            let matches = match token {
                SerializedToken::Leaf { id, text } => {
                    reserved.id_to_token(*id) == Some(text.as_str())
                }
                SerializedToken::Merge { .. } => false,
            };
            if !matches {
                return Err(TokenizerError::Load(format!(
                    "reserved token {} does not match the special tokens",
                    token.id()
                )));
            }
        }

        let specs = tail.iter().map(|token| match token {
            SerializedToken::Leaf { text, .. } => TokenSpec::Symbol(text.clone()),
            SerializedToken::Merge { left, right, .. } => TokenSpec::Merge((*left, *right)),
        });
        let vocab = Vocabulary::from_parts(&special_config, specs)?;

        let rules = vocab.merge_rules();
        if rules.len() != data.merges.len() {
            return Err(TokenizerError::InvalidMerge(format!(
                "{} merges listed but tokens define {}",
                data.merges.len(),
                rules.len()
            )));
        }
        for (rank, (stored, rule)) in data.merges.iter().zip(rules).enumerate() {
            if stored.rank as usize != rank
                || (stored.left, stored.right) != rule.pair
                || stored.result != rule.result
            {
                return Err(TokenizerError::InvalidMerge(format!(
                    "merge at rank {rank} does not match token {}",
                    rule.result
                )));
            }
        }

        Ok((vocab, data.config))
    }

    fn special_config(data: &SerializedTokenizer) -> Result<SpecialTokensConfig> {
        let mut specials = data.special_tokens.clone();
        specials.sort_by_key(|t| t.id);

        if specials.len() != SpecialTokenKind::ALL.len()
            || specials.iter().enumerate().any(|(i, t)| t.id as usize != i)
        {
            return Err(TokenizerError::Load(
                "special tokens must take ids 0 to 3".to_string(),
            ));
        }

        let mut config = SpecialTokensConfig::default();
        for (slot, token) in specials.iter().enumerate() {
            config.order[slot] = token.kind;
            let text = token.text.clone();
            match token.kind {
                SpecialTokenKind::Pad => config.pad = text,
                SpecialTokenKind::Unk => config.unk = text,
                SpecialTokenKind::Bos => config.bos = text,
                SpecialTokenKind::Eos => config.eos = text,
            }
        }
        config.validate()?;
        Ok(config)
    }
}
