//! Evaluate command implementation.

use crate::corpus::read_lines;
use akshar_tokenizer::Tokenizer;
use anyhow::{bail, Context, Result};
use clap::Args;
use log::warn;
use std::path::PathBuf;

/// Sentences every trained model is expected to round-trip.
pub const SAMPLE_SENTENCES: [&str; 5] = [
    "नमस्ते भारत",
    "मैं हिंदी सीख रहा हूं",
    "यह एक परीक्षण वाक्य है",
    "भारत एक विशाल देश है",
    "मुझे हिंदी भाषा बहुत पसंद है",
];

/// Evaluate command arguments.
#[derive(Args, Debug)]
pub struct EvaluateCommand {
    /// Directory holding tokenizer.json
    #[arg(short, long, value_name = "DIR")]
    pub tokenizer: PathBuf,

    /// Evaluation text; lines are joined with spaces
    #[arg(short, long, value_name = "PATH")]
    pub input: PathBuf,

    /// Minimum characters per token
    #[arg(long, default_value_t = 3.2)]
    pub target_ratio: f64,

    /// Vocabulary size must stay below this
    #[arg(long, default_value_t = 5_000)]
    pub max_vocab: usize,
}

pub fn run(cmd: EvaluateCommand) -> Result<()> {
    let tokenizer = Tokenizer::load(&cmd.tokenizer)
        .with_context(|| format!("unable to load tokenizer from {}", cmd.tokenizer.display()))?;

    let text = read_lines(&cmd.input, usize::MAX)?.join(" ");
    let encoding = tokenizer.encode_with(&text, false);
    let ratio = tokenizer.compression_ratio(&text);
    let vocab_size = tokenizer.vocab_size();

    println!("Characters:        {}", text.chars().count());
    println!("Tokens:            {}", encoding.len());
    println!("Compression ratio: {ratio:.2} (target {:.2})", cmd.target_ratio);
    println!(
        "Bytes per token:   {:.2}",
        tokenizer.byte_compression_ratio(&text)
    );
    println!("Vocabulary size:   {vocab_size} (limit {})", cmd.max_vocab);

    let mut failures = Vec::new();
    for sentence in SAMPLE_SENTENCES {
        let decoded = tokenizer.decode(&tokenizer.encode_with(sentence, false).ids);
        if decoded != sentence {
            warn!("round trip changed {sentence:?} into {decoded:?}");
            failures.push(sentence);
        }
    }
    println!(
        "Round trip:        {}/{} sample sentences",
        SAMPLE_SENTENCES.len() - failures.len(),
        SAMPLE_SENTENCES.len()
    );

    if ratio < cmd.target_ratio {
        bail!(
            "compression ratio {ratio:.2} is below the target {:.2}",
            cmd.target_ratio
        );
    }
    if vocab_size >= cmd.max_vocab {
        bail!("vocabulary size {vocab_size} is not below {}", cmd.max_vocab);
    }
    if !failures.is_empty() {
        bail!("{} sample sentences failed to round trip", failures.len());
    }

    println!("All criteria met");
    Ok(())
}
