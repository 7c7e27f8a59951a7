//! Error types for the akshar tokenizer library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the tokenizer library.
///
/// Encoding and decoding never produce errors: unknown text maps to the UNK
/// token and every id sequence decodes. Errors come from configuration,
/// training input, and loading or saving a vocabulary.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// Invalid configuration, detected before training starts
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Training was given no lines, or no words inside the lines
    #[error("Empty corpus: {0}")]
    EmptyCorpus(String),

    /// Vocabulary size exceeded
    #[error("Vocabulary size exceeded maximum of {max} (tried to add {tried})")]
    VocabularyOverflow { max: usize, tried: usize },

    /// Unknown token ID referenced while constructing a vocabulary
    #[error("Unknown token ID: {0}")]
    UnknownTokenId(u32),

    /// Unknown token string referenced while constructing a vocabulary
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    /// Invalid merge rule
    #[error("Invalid merge rule: {0}")]
    InvalidMerge(String),

    /// Error loading a vocabulary
    #[error("Load error: {0}")]
    Load(String),

    /// Error saving a vocabulary
    #[error("Save error: {0}")]
    Save(String),

    /// I/O error with file context
    #[error("I/O error for {}: {err}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TokenizerError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            err,
        }
    }
}

/// Result type alias for tokenizer operations.
pub type Result<T> = std::result::Result<T, TokenizerError>;
