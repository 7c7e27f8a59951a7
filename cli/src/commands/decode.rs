//! Decode command implementation.

use akshar_tokenizer::{TokenId, Tokenizer};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// Decode command arguments.
#[derive(Args, Debug)]
pub struct DecodeCommand {
    /// Directory holding tokenizer.json
    #[arg(short, long, value_name = "DIR")]
    pub tokenizer: PathBuf,

    /// Token IDs to decode, comma or space separated
    #[arg(long, value_name = "IDS")]
    pub tokens: String,
}

fn parse_ids(raw: &str) -> Result<Vec<TokenId>> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<TokenId>()
                .with_context(|| format!("invalid token id {s:?}"))
        })
        .collect()
}

pub fn run(cmd: DecodeCommand) -> Result<()> {
    let tokenizer = Tokenizer::load(&cmd.tokenizer)
        .with_context(|| format!("unable to load tokenizer from {}", cmd.tokenizer.display()))?;

    let ids = parse_ids(&cmd.tokens)?;
    println!("{}", tokenizer.decode(&ids));

    Ok(())
}
