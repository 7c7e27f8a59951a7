//! Metrics describing the evolution of a training run.

use akshar_core::Pair;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Reason a training run terminated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// The vocabulary reached `max_vocab_size`.
    VocabFull,
    /// No pair reached `min_pair_frequency`.
    Converged,
    /// The configured merge iteration cap was reached.
    IterationLimit,
    /// The configured wall-clock budget ran out.
    TimeLimit,
    /// The working corpus reached the target compression ratio.
    TargetReached,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::VocabFull => "vocabulary full",
            Self::Converged => "converged",
            Self::IterationLimit => "iteration limit",
            Self::TimeLimit => "time limit",
            Self::TargetReached => "target compression reached",
        };
        f.write_str(text)
    }
}

/// Metrics captured for each merge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IterationMetrics {
    /// Sequential iteration number (1-indexed).
    pub iteration: usize,
    /// Pair merged in this iteration.
    pub pair: Pair,
    /// Frequency of the pair when it was selected.
    pub frequency: u64,
    /// Occurrences rewritten, weighted by word count.
    pub occurrences: u64,
    /// Distinct words rewritten.
    pub words_touched: usize,
    /// Vocabulary size after the merge.
    pub vocab_size: usize,
    /// Total time elapsed since training started.
    pub elapsed_total: Duration,
}

/// Aggregate metrics produced by a training session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingMetrics {
    /// Per-merge snapshots.
    pub iterations: Vec<IterationMetrics>,
    /// Vocabulary size before the first merge.
    pub initial_vocab_size: usize,
    /// Total duration of the training session.
    pub total_duration: Duration,
    /// Reason training terminated.
    pub stop_reason: StopReason,
}

impl TrainingMetrics {
    /// Creates an empty metrics container with pre-allocated capacity.
    #[must_use]
    pub fn new(initial_vocab_size: usize, capacity: usize) -> Self {
        Self {
            iterations: Vec::with_capacity(capacity),
            initial_vocab_size,
            total_duration: Duration::ZERO,
            stop_reason: StopReason::Converged,
        }
    }

    /// Number of merges learned.
    pub fn merges(&self) -> usize {
        self.iterations.len()
    }

    /// Vocabulary size after the last merge.
    pub fn final_vocab_size(&self) -> usize {
        self.iterations
            .last()
            .map_or(self.initial_vocab_size, |m| m.vocab_size)
    }
}
