//! Train command implementation.

use crate::corpus::read_lines;
use akshar_tokenizer::{NormalizationForm, Tokenizer};
use anyhow::{Context, Result};
use clap::Args;
use log::info;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Train command arguments.
#[derive(Args, Debug)]
pub struct TrainCommand {
    /// Training corpus, one sentence per line
    #[arg(short, long, value_name = "PATH")]
    pub input: PathBuf,

    /// Output directory for the trained model
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,

    /// Maximum vocabulary size, reserved tokens included
    #[arg(long, value_name = "SIZE", default_value_t = 4_999)]
    pub vocab_size: usize,

    /// Minimum pair frequency for a merge
    #[arg(long, value_name = "COUNT", default_value_t = 2)]
    pub min_frequency: u64,

    /// Read at most this many non-empty lines
    #[arg(long, value_name = "LINES", default_value_t = 1_000_000)]
    pub max_lines: usize,

    /// Stop after this many merges
    #[arg(long, value_name = "COUNT")]
    pub max_iterations: Option<usize>,

    /// Stop merging after this many seconds
    #[arg(long, value_name = "SECS")]
    pub time_budget_secs: Option<u64>,

    /// Stop once the training text reaches this many characters per token
    #[arg(long, value_name = "RATIO")]
    pub target_compression: Option<f64>,

    /// Unicode normalization (none, nfc, nfd, nfkc, nfkd)
    #[arg(long, value_name = "FORM", default_value = "none")]
    pub normalization: NormalizationForm,

    /// Wrap encodings in BOS/EOS by default
    #[arg(long)]
    pub wrap_bos_eos: bool,
}

pub fn run(cmd: TrainCommand, show_progress: bool) -> Result<()> {
    let start = Instant::now();
    let lines = read_lines(&cmd.input, cmd.max_lines)?;
    info!(
        "read {} lines from {} in {:.2}s",
        lines.len(),
        cmd.input.display(),
        start.elapsed().as_secs_f64()
    );

    let mut tokenizer = Tokenizer::builder()
        .max_vocab_size(cmd.vocab_size)
        .min_pair_frequency(cmd.min_frequency)
        .max_iterations(cmd.max_iterations)
        .time_budget(cmd.time_budget_secs.map(Duration::from_secs))
        .target_compression(cmd.target_compression)
        .normalization(cmd.normalization)
        .wrap_with_bos_eos(cmd.wrap_bos_eos)
        .show_progress(show_progress)
        .build()
        .context("invalid training configuration")?;

    let start = Instant::now();
    let metrics = tokenizer.train(&lines).context("training failed")?;
    info!(
        "training stopped ({}) after {} merges in {:.2}s",
        metrics.stop_reason,
        metrics.merges(),
        start.elapsed().as_secs_f64()
    );

    let sample = lines.join(" ");
    info!(
        "final vocab size {}, compression ratio {:.2} on the training text",
        tokenizer.vocab_size(),
        tokenizer.compression_ratio(&sample)
    );

    tokenizer
        .save(&cmd.output)
        .with_context(|| format!("unable to save model to {}", cmd.output.display()))?;
    println!("Model saved to {}", cmd.output.display());

    Ok(())
}
