//! Pair counting for BPE training.
//!
//! Counts are kept per distinct word and weighted by how often the word
//! occurs. A position index maps each pair to the words containing it, so a
//! merge only rewrites and recounts those words.

use super::alphabet::CorpusWords;
use ahash::{AHashMap, AHashSet};
use akshar_core::{merge_pair_in_place, MergeCandidate, Pair, PairPriorityQueue, TokenId};

/// Result of applying one merge to the corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Pair occurrences replaced, weighted by word count
    pub occurrences: u64,
    /// Distinct words rewritten
    pub words_touched: usize,
}

/// Adjacent pair statistics with incremental update.
pub struct PairStatistics {
    /// Word -> tokenized representation (as token IDs)
    words: Vec<Vec<TokenId>>,
    /// Word -> frequency count
    word_counts: Vec<u64>,
    /// Pair -> frequency count
    pair_counts: AHashMap<Pair, u64>,
    /// Pair -> words that contained it when last indexed
    positions: AHashMap<Pair, AHashSet<usize>>,
    /// Candidates at or above the frequency floor
    queue: PairPriorityQueue,
}

impl PairStatistics {
    /// Count all pairs of `corpus` and queue those reaching `min_frequency`.
    pub fn new(corpus: CorpusWords, min_frequency: u64) -> Self {
        let (words, word_counts) = corpus.into_parts();
        let pair_counts = count_pairs(&words, &word_counts);

        let mut positions: AHashMap<Pair, AHashSet<usize>> =
            AHashMap::with_capacity(pair_counts.len());
        for (idx, word) in words.iter().enumerate() {
            for w in word.windows(2) {
                positions.entry((w[0], w[1])).or_default().insert(idx);
            }
        }

        let mut queue = PairPriorityQueue::with_floor(min_frequency, pair_counts.len());
        for (&pair, &count) in &pair_counts {
            queue.set(pair, count);
        }

        Self {
            words,
            word_counts,
            pair_counts,
            positions,
            queue,
        }
    }

    /// Remove and return the most frequent pair at or above the floor.
    ///
    /// Ties go to the lexicographically smallest pair. `None` means no pair
    /// reaches the floor.
    pub fn pop_best(&mut self) -> Option<MergeCandidate> {
        self.queue.pop()
    }

    /// Replace every occurrence of `pair` with `new_id` and update counts.
    ///
    /// Only words indexed under `pair` are visited, in ascending order.
    pub fn apply_merge(&mut self, pair: Pair, new_id: TokenId) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();
        let Some(indexed) = self.positions.remove(&pair) else {
            return outcome;
        };
        let mut affected: Vec<usize> = indexed.into_iter().collect();
        affected.sort_unstable();

        let mut deltas: AHashMap<Pair, i64> = AHashMap::new();
        for idx in affected {
            let before = self.words[idx].clone();
            let merged = merge_pair_in_place(&mut self.words[idx], pair, new_id);
            if merged == 0 {
                continue;
            }

            let count = self.word_counts[idx];
            outcome.occurrences += merged as u64 * count;
            outcome.words_touched += 1;

            for w in before.windows(2) {
                *deltas.entry((w[0], w[1])).or_insert(0) -= count as i64;
            }
            for w in self.words[idx].windows(2) {
                let p = (w[0], w[1]);
                *deltas.entry(p).or_insert(0) += count as i64;
                if p.0 == new_id || p.1 == new_id {
                    self.positions.entry(p).or_default().insert(idx);
                }
            }
        }

        for (p, delta) in deltas {
            if delta == 0 {
                continue;
            }
            let current = self.pair_counts.get(&p).copied().unwrap_or(0) as i64;
            let updated = current + delta;
            debug_assert!(updated >= 0, "pair {p:?} count went negative");

            if updated <= 0 {
                self.pair_counts.remove(&p);
                self.positions.remove(&p);
                self.queue.set(p, 0);
            } else {
                self.pair_counts.insert(p, updated as u64);
                self.queue.set(p, updated as u64);
            }
        }

        outcome
    }

    /// Current frequency of a pair.
    pub fn pair_count(&self, pair: Pair) -> u64 {
        self.pair_counts.get(&pair).copied().unwrap_or(0)
    }

    /// All current pair frequencies.
    pub fn pair_counts(&self) -> &AHashMap<Pair, u64> {
        &self.pair_counts
    }

    /// Count every pair from scratch over the current words.
    pub fn recount(&self) -> AHashMap<Pair, u64> {
        count_pairs(&self.words, &self.word_counts)
    }

    /// Get the number of unique words.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Get the total count of all word occurrences.
    pub fn total_word_occurrences(&self) -> u64 {
        self.word_counts.iter().sum()
    }

    /// Get a reference to the words.
    pub fn words(&self) -> &[Vec<TokenId>] {
        &self.words
    }

    /// Get a reference to the word counts.
    pub fn word_counts(&self) -> &[u64] {
        &self.word_counts
    }

    /// Tokens in the working corpus, every word weighted by its count.
    pub fn token_total(&self) -> u64 {
        self.words
            .iter()
            .zip(&self.word_counts)
            .map(|(word, &count)| word.len() as u64 * count)
            .sum()
    }
}

/// Count all pairs, weighting each word by its frequency.
pub fn count_pairs(words: &[Vec<TokenId>], counts: &[u64]) -> AHashMap<Pair, u64> {
    let mut pair_counts: AHashMap<Pair, u64> = AHashMap::new();

    for (word, &count) in words.iter().zip(counts.iter()) {
        for window in word.windows(2) {
            let pair = (window[0], window[1]);
            *pair_counts.entry(pair).or_insert(0) += count;
        }
    }

    pair_counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::alphabet::SymbolAlphabet;
    use akshar_core::{SpecialTokensConfig, VocabularyBuilder};

    fn build(lines: &[&str], min_frequency: u64) -> (PairStatistics, VocabularyBuilder) {
        let mut vocab = VocabularyBuilder::new(&SpecialTokensConfig::default()).unwrap();
        let corpus = SymbolAlphabet::initialize(lines.iter().copied(), &mut vocab).unwrap();
        (PairStatistics::new(corpus, min_frequency), vocab)
    }

    fn sorted(counts: &AHashMap<Pair, u64>) -> Vec<(Pair, u64)> {
        let mut v: Vec<_> = counts.iter().map(|(&p, &c)| (p, c)).collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn test_count_pairs_with_frequency() {
        let (stats, vocab) = build(&["ab ab ab"], 1);
        let a = vocab.symbol_id("a").unwrap();
        let b = vocab.symbol_id("b").unwrap();

        assert_eq!(stats.word_count(), 1);
        assert_eq!(stats.total_word_occurrences(), 3);
        assert_eq!(stats.pair_count((a, b)), 3);
        assert_eq!(stats.pair_count((4, a)), 3);
        assert_eq!(stats.pair_count((b, 4)), 0);
    }

    #[test]
    fn test_pop_best_respects_floor_and_tie_break() {
        let (mut stats, vocab) = build(&["ab cd", "ab cd"], 2);
        let a = vocab.symbol_id("a").unwrap();

        // (4,a), (a,b), (4,c), (c,d) all have count 2; (4,a) is smallest
        let best = stats.pop_best().unwrap();
        assert_eq!(best.pair, (4, a));
        assert_eq!(best.count, 2);

        let (mut sparse, _) = build(&["ab cd"], 2);
        assert!(sparse.pop_best().is_none());
    }

    #[test]
    fn test_apply_merge_updates_neighbours() {
        let (mut stats, mut vocab) = build(&["abc abc bc"], 1);
        let b = vocab.symbol_id("b").unwrap();
        let c = vocab.symbol_id("c").unwrap();
        let a = vocab.symbol_id("a").unwrap();
        let bc = vocab.add_merge((b, c)).unwrap();

        let outcome = stats.apply_merge((b, c), bc);
        assert_eq!(outcome.occurrences, 3);
        assert_eq!(outcome.words_touched, 2);

        assert_eq!(stats.pair_count((b, c)), 0);
        assert_eq!(stats.pair_count((a, b)), 0);
        assert_eq!(stats.pair_count((a, bc)), 2);
        assert_eq!(stats.pair_count((4, bc)), 1);
        assert_eq!(sorted(stats.pair_counts()), sorted(&stats.recount()));
    }

    #[test]
    fn test_incremental_counts_match_recount() {
        let (mut stats, mut vocab) = build(
            &[
                "aaaa abab aaa",
                "baba aab abba",
                "aaaa abab",
                "ab ba aa",
            ],
            1,
        );

        while let Some(best) = stats.pop_best() {
            let id = vocab.add_merge(best.pair).unwrap();
            stats.apply_merge(best.pair, id);
            assert_eq!(sorted(stats.pair_counts()), sorted(&stats.recount()));
        }
        assert!(stats.pair_counts().is_empty());
        assert!(stats.words().iter().all(|w| w.len() == 1));
    }

    #[test]
    fn test_apply_merge_on_missing_pair() {
        let (mut stats, _) = build(&["ab"], 1);
        let outcome = stats.apply_merge((90, 91), 92);
        assert_eq!(outcome, MergeOutcome::default());
    }
}
