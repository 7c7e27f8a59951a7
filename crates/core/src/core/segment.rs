//! Grapheme-aware segmentation shared by training and encoding.
//!
//! Text is split into whitespace-delimited words, and every word into
//! extended grapheme clusters. A cluster keeps a base character together with
//! its combining marks (vowel signs, nukta, anusvara), so "मैं" is a single
//! symbol and no merge can ever separate the mark from its base.

use unicode_segmentation::UnicodeSegmentation;

/// Marker placed at the start of every word (U+2581, LOWER ONE EIGHTH BLOCK).
pub const WORD_BOUNDARY: &str = "\u{2581}";

/// Split a line into words.
pub fn words(line: &str) -> impl Iterator<Item = &str> {
    line.split_whitespace()
}

/// Split a word into grapheme-cluster symbols.
///
/// A literal boundary marker in the input comes out as its own cluster.
/// Callers must not treat it as a symbol.
pub fn symbols(word: &str) -> impl Iterator<Item = &str> {
    word.graphemes(true)
}
