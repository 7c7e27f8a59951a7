//! Encoding text to token ids and decoding ids back to text.
//!
//! Symbols are Unicode extended grapheme clusters. Every word starts with the
//! boundary marker so decoding can restore the spaces between words.

pub mod codec;

pub use codec::Codec;
