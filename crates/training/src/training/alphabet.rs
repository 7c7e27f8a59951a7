//! Initial segmentation of the training corpus.
//!
//! Every line is split into words, every word into grapheme-cluster symbols,
//! and each word gets the boundary marker in front. Leaf symbols are added to
//! the vocabulary in order of first appearance.

use ahash::AHashMap;
use akshar_core::core::segment;
use akshar_core::{Result, TokenId, TokenizerError, VocabularyBuilder, WORD_BOUNDARY};

/// Distinct corpus words as token sequences, with how often each occurs.
///
/// A line is the concatenation of its words, so the table holds the same
/// adjacent pairs as the per-line representation without repeating work for
/// words that occur many times.
#[derive(Debug, Clone, Default)]
pub struct CorpusWords {
    /// Word -> tokenized representation (as token IDs)
    words: Vec<Vec<TokenId>>,
    /// Word -> frequency count
    counts: Vec<u64>,
    /// Line -> word indices, in order
    lines: Vec<Vec<u32>>,
}

impl CorpusWords {
    /// Token sequences of the distinct words.
    pub fn words(&self) -> &[Vec<TokenId>] {
        &self.words
    }

    /// Occurrence count of each distinct word.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Number of lines read.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Initial token sequence of one line.
    pub fn line_tokens(&self, line: usize) -> Option<Vec<TokenId>> {
        let words = self.lines.get(line)?;
        Some(
            words
                .iter()
                .flat_map(|&w| self.words[w as usize].iter().copied())
                .collect(),
        )
    }

    /// Split into the word table and counts, dropping the line index.
    pub fn into_parts(self) -> (Vec<Vec<TokenId>>, Vec<u64>) {
        (self.words, self.counts)
    }
}

/// Grapheme-aware alphabet discovery.
pub struct SymbolAlphabet;

impl SymbolAlphabet {
    /// Segment `lines` and register every new symbol with `vocab`.
    ///
    /// A literal boundary marker in the text is dropped, and a word made only
    /// of markers is skipped. Fails with [`TokenizerError::EmptyCorpus`] when
    /// there are no lines or no line contains a word.
    pub fn initialize<I, S>(lines: I, vocab: &mut VocabularyBuilder) -> Result<CorpusWords>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let marker = vocab.boundary_id();
        let mut corpus = CorpusWords::default();
        let mut index: AHashMap<Vec<TokenId>, u32> = AHashMap::new();

        for line in lines {
            let mut line_words = Vec::new();

            for word in segment::words(line.as_ref()) {
                let mut tokens = vec![marker];
                for symbol in segment::symbols(word) {
                    if symbol == WORD_BOUNDARY {
                        continue;
                    }
                    tokens.push(vocab.add_symbol(symbol)?);
                }
                if tokens.len() == 1 {
                    continue;
                }

                let next = corpus.words.len() as u32;
                let idx = *index.entry(tokens).or_insert_with_key(|tokens| {
                    corpus.words.push(tokens.clone());
                    corpus.counts.push(0);
                    next
                });
                corpus.counts[idx as usize] += 1;
                line_words.push(idx);
            }

            corpus.lines.push(line_words);
        }

        if corpus.lines.is_empty() {
            return Err(TokenizerError::EmptyCorpus(
                "no lines to train on".to_string(),
            ));
        }
        if corpus.words.is_empty() {
            return Err(TokenizerError::EmptyCorpus(format!(
                "{} lines contain no words",
                corpus.lines.len()
            )));
        }

        Ok(corpus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use akshar_core::SpecialTokensConfig;

    fn builder() -> VocabularyBuilder {
        VocabularyBuilder::new(&SpecialTokensConfig::default()).unwrap()
    }

    #[test]
    fn test_symbols_in_first_appearance_order() {
        let mut vocab = builder();
        SymbolAlphabet::initialize(["ba ab", "c"], &mut vocab).unwrap();

        assert_eq!(vocab.symbol_id("b"), Some(5));
        assert_eq!(vocab.symbol_id("a"), Some(6));
        assert_eq!(vocab.symbol_id("c"), Some(7));
        assert_eq!(vocab.len(), 8);
    }

    #[test]
    fn test_words_deduplicated_with_counts() {
        let mut vocab = builder();
        let corpus = SymbolAlphabet::initialize(["ab ab", "ab c"], &mut vocab).unwrap();

        assert_eq!(corpus.words().len(), 2);
        assert_eq!(corpus.counts(), &[3, 1]);
        assert_eq!(corpus.words()[0], vec![4, 5, 6]);
        assert_eq!(corpus.line_count(), 2);
        assert_eq!(corpus.line_tokens(1), Some(vec![4, 5, 6, 4, 7]));
        assert_eq!(corpus.line_tokens(2), None);
    }

    #[test]
    fn test_graphemes_are_single_symbols() {
        let mut vocab = builder();
        let corpus = SymbolAlphabet::initialize(["मैं हिंदी"], &mut vocab).unwrap();

        let mai = vocab.symbol_id("मैं").unwrap();
        assert_eq!(corpus.words()[0], vec![4, mai]);
        assert!(vocab.symbol_id("म").is_none());
    }

    #[test]
    fn test_literal_marker_is_dropped() {
        let mut vocab = builder();
        let corpus = SymbolAlphabet::initialize(["a▁b ▁"], &mut vocab).unwrap();

        assert_eq!(corpus.words().len(), 1);
        assert_eq!(corpus.words()[0].len(), 3);
        assert_eq!(vocab.len(), 7);
    }

    #[test]
    fn test_empty_corpus() {
        let mut vocab = builder();
        let none: Vec<&str> = Vec::new();
        assert!(matches!(
            SymbolAlphabet::initialize(none, &mut vocab),
            Err(TokenizerError::EmptyCorpus(_))
        ));
        assert!(matches!(
            SymbolAlphabet::initialize(["", "   "], &mut vocab),
            Err(TokenizerError::EmptyCorpus(_))
        ));
    }
}
