//! Encode command implementation.

use akshar_tokenizer::Tokenizer;
use anyhow::{Context, Result};
use clap::Args;
use std::io::Read;
use std::path::PathBuf;

/// Encode command arguments.
#[derive(Args, Debug)]
pub struct EncodeCommand {
    /// Directory holding tokenizer.json
    #[arg(short, long, value_name = "DIR")]
    pub tokenizer: PathBuf,

    /// Text to encode, or "-" to read stdin
    #[arg(short, long)]
    pub input: String,

    /// Wrap the ids in BOS/EOS
    #[arg(short, long)]
    pub special_tokens: bool,

    /// Print token texts next to the ids
    #[arg(long)]
    pub show_tokens: bool,
}

pub fn run(cmd: EncodeCommand) -> Result<()> {
    let tokenizer = Tokenizer::load(&cmd.tokenizer)
        .with_context(|| format!("unable to load tokenizer from {}", cmd.tokenizer.display()))?;

    let text = if cmd.input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        buffer
    } else {
        cmd.input
    };

    let text = text.trim_end_matches(&['\r', '\n'][..]);
    let encoding = tokenizer.encode_with(text, cmd.special_tokens);
    let ids: Vec<String> = encoding.ids.iter().map(|id| id.to_string()).collect();
    println!("{}", ids.join(" "));

    if cmd.show_tokens {
        for (id, token) in encoding.ids.iter().zip(tokenizer.tokens(&encoding)) {
            println!("{id}\t{token}");
        }
    }

    Ok(())
}
