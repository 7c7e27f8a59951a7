//! Compression metrics for an encoded text.

use crate::encoding::Codec;

/// Characters per token.
///
/// Characters are Unicode scalar values of the input. BOS/EOS are never
/// counted, whatever the codec's wrapping setting. Input that produces no
/// tokens gives `0.0`.
pub fn compression_ratio(codec: &Codec, text: &str) -> f64 {
    compression_ratio_of(codec, text, text)
}

/// UTF-8 bytes per token, with the same conventions as [`compression_ratio`].
pub fn byte_compression_ratio(codec: &Codec, text: &str) -> f64 {
    byte_compression_ratio_of(codec, text, text)
}

/// Characters of `source` per token of `prepared`.
///
/// For callers that encode a normalized copy of the text: the ratio is still
/// measured against what the caller wrote.
pub fn compression_ratio_of(codec: &Codec, source: &str, prepared: &str) -> f64 {
    ratio(source.chars().count(), codec.encode_with(prepared, false).len())
}

/// UTF-8 bytes of `source` per token of `prepared`.
pub fn byte_compression_ratio_of(codec: &Codec, source: &str, prepared: &str) -> f64 {
    ratio(source.len(), codec.encode_with(prepared, false).len())
}

fn ratio(units: usize, tokens: usize) -> f64 {
    if tokens == 0 {
        0.0
    } else {
        units as f64 / tokens as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vocab::{SpecialTokensConfig, VocabularyBuilder};
    use std::sync::Arc;

    fn codec() -> Codec {
        let mut b = VocabularyBuilder::new(&SpecialTokensConfig::default()).unwrap();
        let a = b.add_symbol("a").unwrap();
        let c = b.add_symbol("b").unwrap();
        let wa = b.add_merge((4, a)).unwrap();
        b.add_merge((wa, c)).unwrap();
        Codec::new(Arc::new(b.build()))
    }

    #[test]
    fn test_ratio_counts_chars_per_token() {
        let codec = codec();
        // "ab ab" -> two tokens, five characters
        assert!((compression_ratio(&codec, "ab ab") - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_ignores_bos_eos() {
        let codec = codec().with_bos_eos(true);
        assert!((compression_ratio(&codec, "ab") - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(compression_ratio(&codec(), ""), 0.0);
        assert_eq!(byte_compression_ratio(&codec(), "  "), 0.0);
    }

    #[test]
    fn test_ratio_of_counts_source_characters() {
        let codec = codec();
        // "ab ab" encoded from a longer source still gives two tokens
        assert!((compression_ratio_of(&codec, "abc abc", "ab ab") - 3.5).abs() < 1e-9);
        assert!((byte_compression_ratio_of(&codec, "ab", "ab ab") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_byte_ratio_uses_utf8_length() {
        let mut b = VocabularyBuilder::new(&SpecialTokensConfig::default()).unwrap();
        let ka = b.add_symbol("क").unwrap();
        b.add_merge((4, ka)).unwrap();
        let codec = Codec::new(Arc::new(b.build()));

        assert!((compression_ratio(&codec, "क") - 1.0).abs() < 1e-9);
        assert!((byte_compression_ratio(&codec, "क") - 3.0).abs() < 1e-9);
    }
}
