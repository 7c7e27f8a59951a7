//! Main tokenizer implementation.
//!
//! `Tokenizer` ties together normalization, training, the codec and
//! persistence behind one type. An untrained tokenizer holds only the reserved
//! tokens, so every symbol encodes to UNK until `train` is called.

use crate::io::{SerializedConfig, TokenizerLoader, TokenizerSaver};
use crate::pre_tokenizer::{NormalizationForm, Normalizer};
use akshar_core::{
    byte_compression_ratio_of, compression_ratio_of, Codec, Result, SpecialTokenKind,
    SpecialTokensConfig, TokenId, TokenizerError, Vocabulary,
};
use akshar_training::{BpeTrainer, TrainingConfig, TrainingMetrics};
use log::debug;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for building a tokenizer.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenizerConfig {
    /// Training parameters, including the special tokens
    pub training: TrainingConfig,
    /// Wrap every encoding in BOS ... EOS
    pub wrap_with_bos_eos: bool,
    /// Unicode normalization applied before training and encoding
    pub normalization: NormalizationForm,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            training: TrainingConfig::default(),
            wrap_with_bos_eos: false,
            normalization: NormalizationForm::None,
        }
    }
}

impl TokenizerConfig {
    fn from_serialized(stored: SerializedConfig, special_tokens: SpecialTokensConfig) -> Self {
        Self {
            training: TrainingConfig {
                max_vocab_size: stored.max_vocab_size,
                min_pair_frequency: stored.min_pair_frequency,
                special_tokens,
                ..TrainingConfig::default()
            },
            wrap_with_bos_eos: stored.wrap_with_bos_eos,
            normalization: stored.normalization,
        }
    }
}

/// Builder for creating a tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerBuilder {
    config: TokenizerConfig,
}

impl TokenizerBuilder {
    /// Create a new tokenizer builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum vocabulary size.
    pub fn max_vocab_size(mut self, size: usize) -> Self {
        self.config.training.max_vocab_size = size;
        self
    }

    /// Set the minimum frequency for merges.
    pub fn min_pair_frequency(mut self, freq: u64) -> Self {
        self.config.training.min_pair_frequency = freq;
        self
    }

    /// Set special token texts and id order.
    pub fn with_special_tokens(mut self, tokens: SpecialTokensConfig) -> Self {
        self.config.training.special_tokens = tokens;
        self
    }

    /// Cap the number of merges.
    pub fn max_iterations(mut self, value: Option<usize>) -> Self {
        self.config.training.max_iterations = value;
        self
    }

    /// Cap the wall-clock time spent merging.
    pub fn time_budget(mut self, value: Option<Duration>) -> Self {
        self.config.training.time_budget = value;
        self
    }

    /// Enable or disable training progress logs.
    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.config.training.show_progress = enabled;
        self
    }

    /// Wrap encodings in BOS ... EOS.
    pub fn wrap_with_bos_eos(mut self, wrap: bool) -> Self {
        self.config.wrap_with_bos_eos = wrap;
        self
    }

    /// Set how many merges pass between progress lines and compression checks.
    pub fn log_interval(mut self, interval: usize) -> Self {
        self.config.training.log_interval = interval;
        self
    }

    /// Stop training once the corpus reaches this many characters per token.
    pub fn target_compression(mut self, target: Option<f64>) -> Self {
        self.config.training.target_compression = target;
        self
    }

    /// Set the Unicode normalization form.
    pub fn normalization(mut self, form: NormalizationForm) -> Self {
        self.config.normalization = form;
        self
    }

    /// Build the tokenizer.
    pub fn build(self) -> Result<Tokenizer> {
        Tokenizer::new(self.config)
    }
}

/// Main tokenizer struct.
///
/// Cheap to clone; clones share the vocabulary.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    /// Codec over the current vocabulary
    codec: Codec,
    /// Configuration
    config: TokenizerConfig,
    /// Unicode normalizer
    normalizer: Normalizer,
    /// Metrics of the last training run
    metrics: Option<TrainingMetrics>,
}

impl Tokenizer {
    /// Create an untrained tokenizer with the given configuration.
    pub fn new(config: TokenizerConfig) -> Result<Self> {
        config.training.validate()?;
        let vocab = Vocabulary::reserved(&config.training.special_tokens)?;
        Ok(Self::from_vocabulary(vocab, config))
    }

    /// Wrap an existing vocabulary.
    pub fn from_vocabulary(vocab: Vocabulary, config: TokenizerConfig) -> Self {
        let codec = Codec::new(Arc::new(vocab)).with_bos_eos(config.wrap_with_bos_eos);
        Self {
            codec,
            normalizer: Normalizer::new(config.normalization),
            config,
            metrics: None,
        }
    }

    /// Create a tokenizer builder.
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    /// Train a new vocabulary on `lines`, replacing the current one.
    ///
    /// Lines are normalized with the configured form first.
    pub fn train<I, S>(&mut self, lines: I) -> Result<&TrainingMetrics>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalizer = self.normalizer;
        let lines = lines
            .into_iter()
            .map(|line| normalizer.normalize(line.as_ref()).into_owned());

        let artifacts = BpeTrainer::new(self.config.training.clone()).train(lines)?;
        self.codec = Codec::new(Arc::new(artifacts.vocabulary))
            .with_bos_eos(self.config.wrap_with_bos_eos);

        let metrics = self.metrics.insert(artifacts.metrics);
        Ok(&*metrics)
    }

    /// Encode text using the configured BOS/EOS wrapping.
    ///
    /// Never fails: unknown symbols become UNK.
    pub fn encode(&self, text: &str) -> Encoding {
        self.encode_with(text, self.config.wrap_with_bos_eos)
    }

    /// Encode text, choosing BOS/EOS wrapping for this call.
    pub fn encode_with(&self, text: &str, add_special_tokens: bool) -> Encoding {
        let normalized = self.normalizer.normalize(text);
        Encoding {
            ids: self.codec.encode_with(&normalized, add_special_tokens),
            text: text.to_string(),
        }
    }

    /// Encode a batch of texts in parallel.
    pub fn encode_batch<S>(&self, texts: &[S]) -> Vec<Encoding>
    where
        S: AsRef<str> + Sync,
    {
        use rayon::prelude::*;

        texts
            .par_iter()
            .map(|text| self.encode(text.as_ref()))
            .collect()
    }

    /// Decode token IDs back to text.
    pub fn decode(&self, ids: &[TokenId]) -> String {
        self.codec.decode(ids)
    }

    /// Decode a batch of id sequences in parallel.
    pub fn decode_batch(&self, batch: &[Vec<TokenId>]) -> Vec<String> {
        use rayon::prelude::*;

        batch.par_iter().map(|ids| self.decode(ids)).collect()
    }

    /// Characters per token for `text`, BOS/EOS excluded.
    ///
    /// Characters are counted in `text` as given, before normalization.
    pub fn compression_ratio(&self, text: &str) -> f64 {
        compression_ratio_of(&self.codec, text, &self.normalizer.normalize(text))
    }

    /// UTF-8 bytes per token for `text`, BOS/EOS excluded.
    pub fn byte_compression_ratio(&self, text: &str) -> f64 {
        byte_compression_ratio_of(&self.codec, text, &self.normalizer.normalize(text))
    }

    /// Get the vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.vocab().len()
    }

    /// Get a reference to the vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        self.codec.vocab()
    }

    /// The codec, for sharing across threads.
    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// The configuration.
    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Metrics of the last `train` call, if any.
    pub fn training_metrics(&self) -> Option<&TrainingMetrics> {
        self.metrics.as_ref()
    }

    /// ID for a token text.
    pub fn token_to_id(&self, text: &str) -> Option<TokenId> {
        self.vocab().token_to_id(text)
    }

    /// Fully expanded text of a token.
    pub fn id_to_token(&self, id: TokenId) -> Option<&str> {
        self.vocab().id_to_token(id)
    }

    /// Texts of the tokens in an encoding.
    ///
    /// Ids outside the vocabulary show as the UNK text.
    pub fn tokens(&self, encoding: &Encoding) -> Vec<String> {
        let unk = self
            .vocab()
            .special_config()
            .text(SpecialTokenKind::Unk);
        encoding
            .ids
            .iter()
            .map(|&id| self.id_to_token(id).unwrap_or(unk).to_string())
            .collect()
    }

    /// Save the tokenizer to a directory as `tokenizer.json`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        TokenizerSaver::new(self.vocab(), &self.config).save(path.as_ref())
    }

    /// Serialize to the `tokenizer.json` format.
    pub fn to_json(&self) -> Result<String> {
        TokenizerSaver::new(self.vocab(), &self.config).to_json()
    }

    /// Load a tokenizer from a directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let (vocab, stored) = TokenizerLoader::load(path.as_ref())?;
        Ok(Self::from_loaded(vocab, stored))
    }

    fn from_loaded(vocab: Vocabulary, stored: SerializedConfig) -> Self {
        let config = TokenizerConfig::from_serialized(stored, vocab.special_config().clone());
        debug!(
            "tokenizer ready: {} tokens, normalization {:?}, bos/eos {}",
            vocab.len(),
            config.normalization,
            config.wrap_with_bos_eos
        );
        Self::from_vocabulary(vocab, config)
    }
}

impl std::str::FromStr for Tokenizer {
    type Err = TokenizerError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (vocab, stored) = TokenizerLoader::from_json(s)?;
        Ok(Self::from_loaded(vocab, stored))
    }
}

/// Result of encoding text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    /// Token IDs
    pub ids: Vec<TokenId>,
    /// Original text
    pub text: String,
}

impl Encoding {
    /// Get the number of tokens.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the encoding is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
