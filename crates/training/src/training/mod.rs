//! Training infrastructure for BPE tokenizers.
//!
//! This module provides the alphabet discovery, pair statistics and merge
//! loop that learn BPE merge rules from text lines.

pub mod alphabet;
pub mod counter;
pub mod metrics;
pub mod trainer;

pub use alphabet::{CorpusWords, SymbolAlphabet};
pub use counter::{count_pairs, MergeOutcome, PairStatistics};
pub use metrics::{IterationMetrics, StopReason, TrainingMetrics};
pub use trainer::{
    BpeTrainer, TrainerArtifacts, TrainingConfig, TrainingConfigBuilder, TrainingSession,
    TrainingState,
};
