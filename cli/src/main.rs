//! Akshar CLI - train and use grapheme-level BPE tokenizers.
//!
//! This is the main entry point for the `akshar` command-line tool.

mod commands;
mod corpus;

use clap::{ArgAction, Parser, Subcommand};
use commands::{DecodeCommand, EncodeCommand, EvaluateCommand, TrainCommand};
use env_logger::Env;
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "akshar")]
#[command(about = "Grapheme-aware BPE tokenizer for Devanagari text", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train a new tokenizer from a text corpus
    Train(TrainCommand),
    /// Encode text to token IDs
    Encode(EncodeCommand),
    /// Decode token IDs back to text
    Decode(DecodeCommand),
    /// Check a trained tokenizer against compression targets
    Evaluate(EvaluateCommand),
}

/// Level forced by `-v`/`-q`; `None` leaves `RUST_LOG` in charge.
fn level_override(verbose: u8, quiet: u8) -> Option<LevelFilter> {
    match (quiet, verbose) {
        (0, 0) => None,
        (1, _) => Some(LevelFilter::Warn),
        (q, _) if q > 1 => Some(LevelFilter::Error),
        (_, 1) => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    if let Some(level) = level_override(verbose, quiet) {
        builder.filter_level(level);
    }
    let _ = builder.try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Train(cmd) => commands::train::run(cmd, cli.quiet == 0)?,
        Commands::Encode(cmd) => commands::encode::run(cmd)?,
        Commands::Decode(cmd) => commands::decode::run(cmd)?,
        Commands::Evaluate(cmd) => commands::evaluate::run(cmd)?,
    }

    Ok(())
}
