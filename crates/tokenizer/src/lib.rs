//! Akshar-tokenizer - High-level tokenizer API
//!
//! This crate wraps training, encoding, decoding and persistence of a
//! grapheme-level BPE tokenizer in one easy-to-use type.
//!
//! # Features
//!
//! - Simple builder pattern for tokenizer configuration
//! - Training from any iterator of text lines
//! - Optional Unicode normalization (NFC, NFD, NFKC, NFKD)
//! - Parallel batch encoding and decoding
//! - Saving and loading a single `tokenizer.json`
//!
//! # Example
//!
//! ```rust
//! use akshar_tokenizer::Tokenizer;
//!
//! let mut tokenizer = Tokenizer::builder()
//!     .max_vocab_size(300)
//!     .min_pair_frequency(2)
//!     .build()?;
//! tokenizer.train(["नमस्ते भारत", "नमस्ते दुनिया"])?;
//!
//! // Encode text
//! let encoding = tokenizer.encode("नमस्ते दुनिया");
//! println!("{:?}", encoding.ids);
//!
//! // Decode tokens
//! assert_eq!(tokenizer.decode(&encoding.ids), "नमस्ते दुनिया");
//! # Ok::<(), akshar_tokenizer::TokenizerError>(())
//! ```

// Re-export core types
pub use akshar_core::{
    Codec, Result, SpecialTokenKind, SpecialTokensConfig, TokenId, TokenizerError, Vocabulary,
};
pub use akshar_training::{StopReason, TrainingConfig, TrainingMetrics};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{Encoding, Tokenizer, TokenizerBuilder, TokenizerConfig};

// IO/Serialization
pub mod io;
pub use io::{SerializedTokenizer, TokenizerLoader, TokenizerSaver};

// Pre-tokenization
pub mod pre_tokenizer;
pub use pre_tokenizer::{NormalizationForm, Normalizer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
