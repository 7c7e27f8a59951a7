//! Merge rule management for BPE.
//!
//! Merge rules are stored using token IDs rather than strings for fast
//! comparison. A rule's rank is its creation order: rank 0 was the first
//! merge learned during training and always wins over later ones.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Token identifier. Ids are dense and assigned in creation order.
pub type TokenId = u32;

/// A pair of token IDs that can be merged.
pub type Pair = (TokenId, TokenId);

/// Merge rule mapping: pair -> (rank, new_token_id).
pub type MergeMap = AHashMap<Pair, (u32, TokenId)>;

/// A single learned merge: `pair.0` followed by `pair.1` becomes `result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergeRule {
    /// Left and right constituents
    pub pair: Pair,
    /// Token created by this merge
    pub result: TokenId,
}

impl MergeRule {
    pub fn new(pair: Pair, result: TokenId) -> Self {
        Self { pair, result }
    }
}

/// Ordered collection of BPE merge rules with a pair index.
#[derive(Debug, Clone, Default)]
pub struct MergeRules {
    /// Rules in creation order; the index is the rank
    rules: Vec<MergeRule>,
    /// pair -> (rank, new_token_id)
    merges: MergeMap,
}

impl MergeRules {
    /// Create a new empty collection of merge rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a merge rule. Its rank is the number of rules already present.
    ///
    /// Returns the rank, or `None` if the pair already has a rule (a pair is
    /// only ever merged once).
    pub fn push(&mut self, pair: Pair, new_token_id: TokenId) -> Option<u32> {
        if self.merges.contains_key(&pair) {
            return None;
        }
        let rank = self.rules.len() as u32;
        self.rules.push(MergeRule::new(pair, new_token_id));
        self.merges.insert(pair, (rank, new_token_id));
        Some(rank)
    }

    /// Rank and result of the rule for `pair`.
    #[inline]
    pub fn get(&self, pair: Pair) -> Option<(u32, TokenId)> {
        self.merges.get(&pair).copied()
    }

    /// Rank of the rule for `pair`, if any.
    #[inline]
    pub fn rank(&self, pair: Pair) -> Option<u32> {
        self.get(pair).map(|(rank, _)| rank)
    }

    /// Rules in rank order.
    #[inline]
    pub fn as_slice(&self) -> &[MergeRule] {
        &self.rules
    }

    /// Get the number of merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Find the lowest-ranked rule that applies somewhere in `tokens`.
    pub fn best_in(&self, tokens: &[TokenId]) -> Option<(u32, MergeRule)> {
        tokens
            .windows(2)
            .filter_map(|w| self.get((w[0], w[1])))
            .min_by_key(|&(rank, _)| rank)
            .map(|(rank, _)| (rank, self.rules[rank as usize]))
    }
}

/// Replace every occurrence of `pair` in `tokens` with `new_id`.
///
/// Occurrences are taken left to right without overlap, so `[a, a, a]`
/// merged on `(a, a)` gives `[x, a]`. Training and encoding both go through
/// this function, which keeps their results identical.
///
/// Returns the number of occurrences replaced.
pub fn merge_pair_in_place(tokens: &mut Vec<TokenId>, pair: Pair, new_id: TokenId) -> usize {
    if tokens.len() < 2 {
        return 0;
    }

    let mut merged = 0;
    let mut read = 0;
    let mut write = 0;

    while read < tokens.len() {
        if read + 1 < tokens.len() && tokens[read] == pair.0 && tokens[read + 1] == pair.1 {
            tokens[write] = new_id;
            read += 2;
            merged += 1;
        } else {
            tokens[write] = tokens[read];
            read += 1;
        }
        write += 1;
    }

    tokens.truncate(write);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_ranks_in_order() {
        let mut rules = MergeRules::new();
        assert_eq!(rules.push((0, 1), 100), Some(0));
        assert_eq!(rules.push((1, 2), 101), Some(1));

        assert_eq!(rules.get((0, 1)), Some((0, 100)));
        assert_eq!(rules.get((1, 2)), Some((1, 101)));
        assert_eq!(rules.get((2, 3)), None);
        assert_eq!(rules.as_slice()[1], MergeRule::new((1, 2), 101));
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let mut rules = MergeRules::new();
        rules.push((0, 1), 100);
        assert_eq!(rules.push((0, 1), 101), None);
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn test_best_in_prefers_lowest_rank() {
        let mut rules = MergeRules::new();
        rules.push((2, 3), 10);
        rules.push((1, 2), 11);

        let (rank, rule) = rules.best_in(&[1, 2, 3]).unwrap();
        assert_eq!(rank, 0);
        assert_eq!(rule.pair, (2, 3));
        assert!(rules.best_in(&[3, 1]).is_none());
    }

    #[test]
    fn test_merge_pair_in_place() {
        let mut tokens = vec![1, 2, 3, 1, 2];
        assert_eq!(merge_pair_in_place(&mut tokens, (1, 2), 9), 2);
        assert_eq!(tokens, vec![9, 3, 9]);
    }

    #[test]
    fn test_merge_pair_overlapping_runs() {
        let mut tokens = vec![5, 5, 5];
        assert_eq!(merge_pair_in_place(&mut tokens, (5, 5), 7), 1);
        assert_eq!(tokens, vec![7, 5]);

        let mut tokens = vec![5, 5, 5, 5];
        assert_eq!(merge_pair_in_place(&mut tokens, (5, 5), 7), 2);
        assert_eq!(tokens, vec![7, 7]);
    }

    #[test]
    fn test_merge_pair_short_input() {
        let mut tokens = vec![1];
        assert_eq!(merge_pair_in_place(&mut tokens, (1, 1), 2), 0);
        assert_eq!(tokens, vec![1]);
    }
}
