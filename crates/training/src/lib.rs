//! Akshar-training - BPE training infrastructure
//!
//! This crate learns BPE merge rules over grapheme-cluster symbols from a
//! finite sequence of text lines.
//!
//! # Features
//!
//! - Grapheme-aware alphabet discovery with a word boundary marker
//! - Incremental pair counting driven by a pair -> words position index
//! - Deterministic merge order (highest count, then smallest pair)
//! - Vocabulary cap, frequency floor, iteration and wall-clock budgets
//! - Per-merge metrics and progress logging through `log`
//!
//! # Example
//!
//! ```rust
//! use akshar_training::{BpeTrainer, TrainingConfig};
//!
//! let config = TrainingConfig::builder()
//!     .max_vocab_size(300)
//!     .min_pair_frequency(2)
//!     .build()?;
//!
//! let trainer = BpeTrainer::new(config);
//! let artifacts = trainer.train(["नमस्ते भारत", "नमस्ते दुनिया"])?;
//! assert!(artifacts.vocabulary.token_to_id("▁नमस्ते").is_some());
//! # Ok::<(), akshar_training::TokenizerError>(())
//! ```

pub use akshar_core::{Result, TokenizerError};

// Training infrastructure
pub mod training;
pub use training::{
    BpeTrainer, CorpusWords, IterationMetrics, MergeOutcome, PairStatistics, StopReason,
    SymbolAlphabet, TrainerArtifacts, TrainingConfig, TrainingConfigBuilder, TrainingMetrics,
    TrainingSession, TrainingState,
};
