//! BPE trainer implementation.
//!
//! Training is an explicit state machine owned by [`TrainingSession`]. Each
//! step merges the most frequent adjacent pair, appends one token and one
//! merge rule, and rewrites the affected words. The session stops when the
//! vocabulary is full, when no pair reaches the frequency floor, or when an
//! external iteration or time budget runs out.

use super::alphabet::SymbolAlphabet;
use super::counter::PairStatistics;
use super::metrics::{IterationMetrics, StopReason, TrainingMetrics};
use akshar_core::{
    Result, SpecialTokenKind, SpecialTokensConfig, TokenizerError, Vocabulary, VocabularyBuilder,
};
use log::{debug, info};
use std::time::{Duration, Instant};

/// Configuration for BPE training.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Maximum vocabulary size, including special tokens and the marker
    pub max_vocab_size: usize,
    /// Minimum frequency for a pair to be merged
    pub min_pair_frequency: u64,
    /// Special token texts and id order
    pub special_tokens: SpecialTokensConfig,
    /// Hard cap on merges; `None` means no cap
    pub max_iterations: Option<usize>,
    /// Wall-clock budget for the merge loop; `None` means unlimited
    pub time_budget: Option<Duration>,
    /// Enables progress logging through the `log` facade
    pub show_progress: bool,
    /// Merges between progress lines and compression checks
    pub log_interval: usize,
    /// Stop once the working corpus reaches this many characters per token
    pub target_compression: Option<f64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_vocab_size: 4_999,
            min_pair_frequency: 2,
            special_tokens: SpecialTokensConfig::default(),
            max_iterations: None,
            time_budget: None,
            show_progress: true,
            log_interval: 50,
            target_compression: None,
        }
    }
}

impl TrainingConfig {
    /// Returns a builder initialised with [`TrainingConfig::default`].
    #[must_use]
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::default()
    }

    /// Number of ids taken before any symbol: the special tokens and the marker.
    pub fn reserved_len() -> usize {
        SpecialTokenKind::ALL.len() + 1
    }

    /// Validates the invariants required for training.
    pub fn validate(&self) -> Result<()> {
        self.special_tokens.validate()?;

        if self.max_vocab_size <= Self::reserved_len() {
            return Err(TokenizerError::InvalidConfig(format!(
                "max_vocab_size ({}) must exceed the {} reserved tokens",
                self.max_vocab_size,
                Self::reserved_len()
            )));
        }
        if self.max_vocab_size > u32::MAX as usize {
            return Err(TokenizerError::InvalidConfig(format!(
                "max_vocab_size ({}) exceeds the largest token id",
                self.max_vocab_size
            )));
        }
        if self.min_pair_frequency == 0 {
            return Err(TokenizerError::InvalidConfig(
                "min_pair_frequency must be greater than zero".into(),
            ));
        }
        if self.log_interval == 0 {
            return Err(TokenizerError::InvalidConfig(
                "log_interval must be greater than zero".into(),
            ));
        }
        if let Some(target) = self.target_compression {
            if !target.is_finite() || target <= 0.0 {
                return Err(TokenizerError::InvalidConfig(format!(
                    "target_compression ({target}) must be a positive number"
                )));
            }
        }
        Ok(())
    }
}

/// Builder for [`TrainingConfig`].
#[derive(Debug, Default, Clone)]
pub struct TrainingConfigBuilder {
    cfg: TrainingConfig,
}

impl TrainingConfigBuilder {
    /// Creates a builder with [`TrainingConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum vocabulary size.
    #[must_use]
    pub fn max_vocab_size(mut self, value: usize) -> Self {
        self.cfg.max_vocab_size = value;
        self
    }

    /// Sets the minimum pair frequency.
    #[must_use]
    pub fn min_pair_frequency(mut self, value: u64) -> Self {
        self.cfg.min_pair_frequency = value;
        self
    }

    /// Overrides the special token texts and order.
    #[must_use]
    pub fn special_tokens(mut self, value: SpecialTokensConfig) -> Self {
        self.cfg.special_tokens = value;
        self
    }

    /// Sets a hard merge iteration limit.
    #[must_use]
    pub fn max_iterations(mut self, value: Option<usize>) -> Self {
        self.cfg.max_iterations = value;
        self
    }

    /// Sets a wall-clock budget for the merge loop.
    #[must_use]
    pub fn time_budget(mut self, value: Option<Duration>) -> Self {
        self.cfg.time_budget = value;
        self
    }

    /// Enables or disables progress logging.
    #[must_use]
    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.cfg.show_progress = enabled;
        self
    }

    /// Sets how many merges pass between progress lines.
    #[must_use]
    pub fn log_interval(mut self, value: usize) -> Self {
        self.cfg.log_interval = value;
        self
    }

    /// Stops training early once the working corpus reaches `value`
    /// characters per token.
    #[must_use]
    pub fn target_compression(mut self, value: Option<f64>) -> Self {
        self.cfg.target_compression = value;
        self
    }

    /// Finalises the builder, returning a validated [`TrainingConfig`].
    pub fn build(self) -> Result<TrainingConfig> {
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}

/// State of a training session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingState {
    /// Merges are still being learned.
    Running,
    /// The size cap or an external budget stopped training.
    VocabFull,
    /// No pair reaches the frequency floor.
    Converged,
    /// The vocabulary has been frozen.
    Done,
}

/// Output of a finished training run.
#[derive(Debug, Clone)]
pub struct TrainerArtifacts {
    /// The trained, immutable vocabulary.
    pub vocabulary: Vocabulary,
    /// Per-merge and aggregate metrics.
    pub metrics: TrainingMetrics,
}

/// One training run over an in-memory corpus.
pub struct TrainingSession {
    config: TrainingConfig,
    vocab: VocabularyBuilder,
    stats: PairStatistics,
    state: TrainingState,
    metrics: TrainingMetrics,
    /// Characters in the working corpus; merging never changes it
    corpus_chars: u64,
    started: Instant,
}

impl TrainingSession {
    /// Validate `config`, segment `lines` and count the initial pairs.
    ///
    /// Fails before any merge if the config is invalid, the corpus is empty,
    /// or the alphabet alone is larger than `max_vocab_size`.
    pub fn new<I, S>(config: TrainingConfig, lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        config.validate()?;

        let mut vocab = VocabularyBuilder::new(&config.special_tokens)?;
        let corpus = SymbolAlphabet::initialize(lines, &mut vocab)?;

        if vocab.len() > config.max_vocab_size {
            return Err(TokenizerError::VocabularyOverflow {
                max: config.max_vocab_size,
                tried: vocab.len(),
            });
        }

        if config.show_progress {
            info!(
                "alphabet: {} lines, {} distinct words, {} symbols; vocab {} / {}",
                corpus.line_count(),
                corpus.words().len(),
                vocab.len() - TrainingConfig::reserved_len(),
                vocab.len(),
                config.max_vocab_size
            );
        }

        let stats = PairStatistics::new(corpus, config.min_pair_frequency);
        let corpus_chars: u64 = stats
            .words()
            .iter()
            .zip(stats.word_counts())
            .map(|(word, &count)| {
                let chars: usize = word
                    .iter()
                    .map(|&id| vocab.token(id).map_or(0, |t| t.chars().count()))
                    .sum();
                chars as u64 * count
            })
            .sum();
        let capacity = config.max_vocab_size - vocab.len();
        let metrics = TrainingMetrics::new(vocab.len(), capacity.min(4096));

        let mut session = Self {
            config,
            vocab,
            stats,
            state: TrainingState::Running,
            metrics,
            corpus_chars,
            started: Instant::now(),
        };
        if session.vocab.len() >= session.config.max_vocab_size {
            session.stop(TrainingState::VocabFull, StopReason::VocabFull);
        }
        Ok(session)
    }

    /// Current state.
    pub fn state(&self) -> TrainingState {
        self.state
    }

    /// Current vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Metrics recorded so far.
    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    /// Pair statistics of the working corpus.
    pub fn statistics(&self) -> &PairStatistics {
        &self.stats
    }

    /// The configuration this session runs with.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Perform one transition out of `Running`.
    ///
    /// Does nothing once the session has stopped.
    pub fn step(&mut self) -> Result<TrainingState> {
        if self.state != TrainingState::Running {
            return Ok(self.state);
        }

        if let Some(reason) = self.budget_exhausted() {
            self.stop(TrainingState::VocabFull, reason);
            return Ok(self.state);
        }

        let Some(best) = self.stats.pop_best() else {
            self.stop(TrainingState::Converged, StopReason::Converged);
            return Ok(self.state);
        };

        let new_id = self.vocab.add_merge(best.pair)?;
        let outcome = self.stats.apply_merge(best.pair, new_id);
        assert!(
            outcome.occurrences > 0,
            "selected pair {:?} has no occurrences",
            best.pair
        );

        let iteration = self.metrics.iterations.len() + 1;
        self.metrics.iterations.push(IterationMetrics {
            iteration,
            pair: best.pair,
            frequency: best.count,
            occurrences: outcome.occurrences,
            words_touched: outcome.words_touched,
            vocab_size: self.vocab.len(),
            elapsed_total: self.started.elapsed(),
        });

        debug!(
            "merge {:>6} {:?} -> {} {:?} freq {} words {}",
            iteration,
            best.pair,
            new_id,
            self.vocab.token(new_id).unwrap_or_default(),
            best.count,
            outcome.words_touched
        );
        if self.vocab.len() >= self.config.max_vocab_size {
            self.stop(TrainingState::VocabFull, StopReason::VocabFull);
        }

        let checkpoint = iteration % self.config.log_interval == 0;
        if checkpoint && (self.config.show_progress || self.config.target_compression.is_some()) {
            let ratio = self.compression_ratio();
            if self.config.show_progress {
                info!(
                    "iter {:>6} freq {:>8} words {:>8} vocab {:>6} ratio {:.2}",
                    iteration,
                    best.count,
                    outcome.words_touched,
                    self.vocab.len(),
                    ratio
                );
            }
            if let Some(target) = self.config.target_compression {
                if self.state == TrainingState::Running && ratio >= target {
                    self.stop(TrainingState::VocabFull, StopReason::TargetReached);
                }
            }
        }
        Ok(self.state)
    }

    /// Characters per token over the working corpus.
    ///
    /// Each word's marker stands in for the space before it.
    pub fn compression_ratio(&self) -> f64 {
        match self.stats.token_total() {
            0 => 0.0,
            tokens => self.corpus_chars as f64 / tokens as f64,
        }
    }

    /// Step until the session stops.
    pub fn run(&mut self) -> Result<TrainingState> {
        while self.step()? == TrainingState::Running {}
        Ok(self.state)
    }

    /// Run to completion and freeze the vocabulary.
    pub fn finish(mut self) -> Result<TrainerArtifacts> {
        self.run()?;
        self.metrics.total_duration = self.started.elapsed();
        self.state = TrainingState::Done;

        if self.config.show_progress {
            info!(
                "completed {} merges in {:.2?} ({}); vocab size {}",
                self.metrics.merges(),
                self.metrics.total_duration,
                self.metrics.stop_reason,
                self.vocab.len()
            );
        }

        Ok(TrainerArtifacts {
            vocabulary: self.vocab.build(),
            metrics: self.metrics,
        })
    }

    fn budget_exhausted(&self) -> Option<StopReason> {
        if let Some(max) = self.config.max_iterations {
            if self.vocab.merge_count() >= max {
                return Some(StopReason::IterationLimit);
            }
        }
        if let Some(budget) = self.config.time_budget {
            if self.started.elapsed() >= budget {
                return Some(StopReason::TimeLimit);
            }
        }
        None
    }

    fn stop(&mut self, state: TrainingState, reason: StopReason) {
        self.state = state;
        self.metrics.stop_reason = reason;
    }
}

/// BPE trainer.
///
/// Trains a vocabulary from text lines by iteratively merging the most
/// frequent adjacent pair of tokens.
#[derive(Debug, Clone, Default)]
pub struct BpeTrainer {
    config: TrainingConfig,
}

impl BpeTrainer {
    /// Create a new BPE trainer with the given configuration.
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// The trainer's configuration.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train on the given lines.
    pub fn train<I, S>(&self, lines: I) -> Result<TrainerArtifacts>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        TrainingSession::new(self.config.clone(), lines)?.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use akshar_core::{Codec, TokenKind};
    use std::sync::Arc;

    fn config(max_vocab_size: usize, min_pair_frequency: u64) -> TrainingConfig {
        TrainingConfig::builder()
            .max_vocab_size(max_vocab_size)
            .min_pair_frequency(min_pair_frequency)
            .show_progress(false)
            .build()
            .unwrap()
    }

    #[test]
    fn test_repeated_word_becomes_one_token() {
        let trainer = BpeTrainer::new(config(300, 2));
        let out = trainer.train(["नमस्ते भारत", "नमस्ते दुनिया"]).unwrap();

        assert_eq!(out.metrics.stop_reason, StopReason::Converged);
        let id = out.vocabulary.token_to_id("▁नमस्ते").unwrap();
        assert!(matches!(out.vocabulary.kind(id), Some(TokenKind::Merged(_))));

        let codec = Codec::new(Arc::new(out.vocabulary));
        assert_eq!(codec.encode("नमस्ते"), vec![id]);
        assert_eq!(
            codec.decode(&codec.encode("नमस्ते दुनिया")),
            "नमस्ते दुनिया"
        );
    }

    #[test]
    fn test_training_is_deterministic() {
        let lines = [
            "मैं हिंदी सीख रहा हूं",
            "मुझे हिंदी भाषा बहुत पसंद है",
            "यह एक परीक्षण वाक्य है",
            "भारत एक विशाल देश है",
        ];
        let first = BpeTrainer::new(config(200, 1)).train(lines).unwrap();
        let second = BpeTrainer::new(config(200, 1)).train(lines).unwrap();

        assert_eq!(
            first.vocabulary.merge_rules(),
            second.vocabulary.merge_rules()
        );
        let a: Vec<_> = first.vocabulary.iter().map(|(_, e)| e.clone()).collect();
        let b: Vec<_> = second.vocabulary.iter().map(|(_, e)| e.clone()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_vocab_grows_by_one_per_merge() {
        let out = BpeTrainer::new(config(300, 1))
            .train(["aaab abab baba", "abba aaab"])
            .unwrap();

        let initial = out.metrics.initial_vocab_size;
        for (i, m) in out.metrics.iterations.iter().enumerate() {
            assert_eq!(m.iteration, i + 1);
            assert_eq!(m.vocab_size, initial + i + 1);
        }
        assert_eq!(out.vocabulary.len(), out.metrics.final_vocab_size());
        assert_eq!(
            out.vocabulary.merge_rules().len(),
            out.vocabulary.len() - initial
        );
    }

    #[test]
    fn test_stops_at_vocab_cap() {
        // alphabet: 5 reserved + a, b, c
        let out = BpeTrainer::new(config(10, 1))
            .train(["abcabc abc cab", "bca abc"])
            .unwrap();

        assert_eq!(out.vocabulary.len(), 10);
        assert_eq!(out.metrics.stop_reason, StopReason::VocabFull);
    }

    #[test]
    fn test_min_frequency_floor() {
        let out = BpeTrainer::new(config(100, 5)).train(["ab cd ef"]).unwrap();

        assert!(out.vocabulary.merge_rules().is_empty());
        assert_eq!(out.metrics.stop_reason, StopReason::Converged);
    }

    #[test]
    fn test_iteration_budget_stops_gracefully() {
        let cfg = TrainingConfig::builder()
            .max_vocab_size(300)
            .min_pair_frequency(1)
            .max_iterations(Some(3))
            .show_progress(false)
            .build()
            .unwrap();
        let mut session = TrainingSession::new(cfg, ["abcdef abcdef"]).unwrap();

        assert_eq!(session.run().unwrap(), TrainingState::VocabFull);
        assert_eq!(session.metrics().stop_reason, StopReason::IterationLimit);
        assert_eq!(session.metrics().merges(), 3);
        // Stepping a stopped session is a no-op
        assert_eq!(session.step().unwrap(), TrainingState::VocabFull);
        assert_eq!(session.metrics().merges(), 3);
    }

    #[test]
    fn test_zero_time_budget() {
        let cfg = TrainingConfig::builder()
            .min_pair_frequency(1)
            .time_budget(Some(Duration::ZERO))
            .show_progress(false)
            .build()
            .unwrap();
        let out = TrainingSession::new(cfg, ["abab"]).unwrap().finish().unwrap();

        assert_eq!(out.metrics.stop_reason, StopReason::TimeLimit);
        assert!(out.vocabulary.merge_rules().is_empty());
    }

    #[test]
    fn test_session_steps() {
        let mut session = TrainingSession::new(config(300, 2), ["ab ab"]).unwrap();
        assert_eq!(session.state(), TrainingState::Running);
        assert_eq!(session.vocab_size(), 7);

        // (▁,a) then (▁a,b), then nothing left at frequency 2
        assert_eq!(session.step().unwrap(), TrainingState::Running);
        assert_eq!(session.step().unwrap(), TrainingState::Running);
        assert_eq!(session.step().unwrap(), TrainingState::Converged);
        assert_eq!(session.vocab_size(), 9);
        assert!(session.statistics().pair_counts().is_empty());
    }

    #[test]
    fn test_empty_corpus_fails_before_training() {
        let none: Vec<String> = Vec::new();
        assert!(matches!(
            BpeTrainer::new(config(100, 2)).train(none),
            Err(TokenizerError::EmptyCorpus(_))
        ));
    }

    #[test]
    fn test_alphabet_overflow() {
        let result = BpeTrainer::new(config(7, 2)).train(["abc"]);
        assert!(matches!(
            result,
            Err(TokenizerError::VocabularyOverflow { max: 7, tried: 8 })
        ));

        let exact = BpeTrainer::new(config(8, 1)).train(["abc"]).unwrap();
        assert_eq!(exact.vocabulary.len(), 8);
        assert_eq!(exact.metrics.stop_reason, StopReason::VocabFull);
        assert!(exact.vocabulary.merge_rules().is_empty());
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            TrainingConfig::builder().max_vocab_size(5).build(),
            Err(TokenizerError::InvalidConfig(_))
        ));
        assert!(TrainingConfig::builder().min_pair_frequency(0).build().is_err());
        assert!(TrainingConfig::builder().log_interval(0).build().is_err());
        assert!(TrainingConfig::builder()
            .target_compression(Some(0.0))
            .build()
            .is_err());
        assert!(TrainingConfig::builder()
            .target_compression(Some(f64::NAN))
            .build()
            .is_err());
        assert!(TrainingConfig::builder().build().is_ok());
    }

    #[test]
    fn test_stops_at_target_compression() {
        let cfg = TrainingConfig::builder()
            .max_vocab_size(300)
            .min_pair_frequency(1)
            .log_interval(1)
            .target_compression(Some(2.0))
            .show_progress(false)
            .build()
            .unwrap();
        let mut session = TrainingSession::new(cfg, ["abcd abcd abcd abcd"]).unwrap();
        assert_eq!(session.compression_ratio(), 1.0);

        // Each merge removes one token from each copy of "▁abcd": 5/4, 5/3, 5/2
        assert_eq!(session.run().unwrap(), TrainingState::VocabFull);
        assert_eq!(session.metrics().stop_reason, StopReason::TargetReached);
        assert_eq!(session.metrics().merges(), 3);
        assert_eq!(session.compression_ratio(), 2.5);
    }

    #[test]
    fn test_ratio_checked_only_at_log_interval() {
        let cfg = TrainingConfig::builder()
            .max_vocab_size(300)
            .min_pair_frequency(1)
            .log_interval(4)
            .target_compression(Some(2.0))
            .show_progress(false)
            .build()
            .unwrap();
        let out = TrainingSession::new(cfg, ["abcd abcd abcd abcd"])
            .unwrap()
            .finish()
            .unwrap();

        // The word is a single token after 4 merges, the first checkpoint
        assert_eq!(out.metrics.stop_reason, StopReason::TargetReached);
        assert_eq!(out.metrics.merges(), 4);
    }

    #[test]
    fn test_corpus_symbol_may_share_special_text() {
        let cfg = TrainingConfig::builder()
            .special_tokens(SpecialTokensConfig {
                unk: "?".to_string(),
                ..Default::default()
            })
            .min_pair_frequency(1)
            .show_progress(false)
            .build()
            .unwrap();
        let out = BpeTrainer::new(cfg).train(["क्या? हाँ?"]).unwrap();

        let question = out.vocabulary.symbol_id("?").unwrap();
        assert_ne!(
            question,
            out.vocabulary.special_token_id(SpecialTokenKind::Unk)
        );
        let codec = Codec::new(Arc::new(out.vocabulary));
        assert_eq!(codec.decode(&codec.encode("हाँ?")), "हाँ?");
    }
}
