//! Merge candidate queue used by training.
//!
//! Candidates are ordered by count, highest first. Equal counts go to the
//! lexicographically smallest `(left, right)` pair, so training picks the same
//! pair on every run whatever the hash map iteration order. Pairs whose count
//! drops below the frequency floor are never returned.

use crate::core::merges::Pair;
use ahash::AHashMap;
use dary_heap::OctonaryHeap;
use std::cmp::Ordering;

/// A pair and its corpus frequency at the time it was queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeCandidate {
    pub pair: Pair,
    pub count: u64,
}

impl MergeCandidate {
    pub fn new(pair: Pair, count: u64) -> Self {
        Self { pair, count }
    }
}

impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: larger count wins, then the smaller pair
        self.count
            .cmp(&other.count)
            .then_with(|| other.pair.cmp(&self.pair))
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Lazily re-keyed max-heap of merge candidates.
///
/// `set` pushes a fresh entry rather than re-keying the old one; `pop`
/// discards heap entries whose count differs from the live count.
#[derive(Debug)]
pub struct PairPriorityQueue {
    heap: OctonaryHeap<MergeCandidate>,
    /// Live count of every queued pair
    live: AHashMap<Pair, u64>,
    floor: u64,
}

impl PairPriorityQueue {
    /// Empty queue that ignores counts below `floor`.
    pub fn with_floor(floor: u64, capacity: usize) -> Self {
        Self {
            heap: OctonaryHeap::with_capacity(capacity),
            live: AHashMap::with_capacity(capacity),
            floor,
        }
    }

    /// Minimum count a pair needs to be returned.
    pub fn floor(&self) -> u64 {
        self.floor
    }

    /// Record the current count of `pair`.
    ///
    /// A count below the floor withdraws the pair.
    pub fn set(&mut self, pair: Pair, count: u64) {
        if count == 0 || count < self.floor {
            self.live.remove(&pair);
            return;
        }
        if self.live.insert(pair, count) != Some(count) {
            self.heap.push(MergeCandidate::new(pair, count));
        }
    }

    /// Remove and return the best live candidate.
    pub fn pop(&mut self) -> Option<MergeCandidate> {
        while let Some(candidate) = self.heap.pop() {
            if self.live.get(&candidate.pair) == Some(&candidate.count) {
                self.live.remove(&candidate.pair);
                return Some(candidate);
            }
        }
        None
    }

    /// Live count of `pair`, if queued.
    pub fn count(&self, pair: Pair) -> Option<u64> {
        self.live.get(&pair).copied()
    }

    /// Number of live candidates.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
