//! Serialization and deserialization for trained models.
//!
//! A model directory holds a single pretty-printed `tokenizer.json`.

pub mod format;
pub mod load;
pub mod save;

pub use format::{
    SerializedConfig, SerializedMerge, SerializedSpecialToken, SerializedToken,
    SerializedTokenizer, TOKENIZER_FILE,
};
pub use load::TokenizerLoader;
pub use save::TokenizerSaver;
