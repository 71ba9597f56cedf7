//! Score accumulation.

use std::collections::HashMap;
use std::hash::Hash;

/// Accumulates a numeric score per key.
///
/// Scores only ever grow through [ScoreMap::inc]. Keys can be read back
/// ordered by their accumulated score; keys with equal scores are ordered
/// by the key itself so the output is deterministic.
#[derive(Debug, Clone)]
pub struct ScoreMap<K> {
    scores: HashMap<K, u64>,
}

impl<K> Default for ScoreMap<K> {
    fn default() -> Self {
        Self {
            scores: HashMap::new(),
        }
    }
}

impl<K: Clone + Eq + Hash + Ord> ScoreMap<K> {
    /// Construct an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to the score of `key`, inserting it at zero first if
    /// it is not yet known.
    pub fn inc(&mut self, key: K, amount: u64) {
        let score = self.scores.entry(key).or_default();
        *score = score.saturating_add(amount);
    }

    /// The accumulated score of `key`, if it was ever incremented.
    pub fn get(&self, key: &K) -> Option<u64> {
        self.scores.get(key).copied()
    }

    /// Number of scored keys.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Returns `true` if nothing was scored yet.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// All keys ordered by score, ascending if `up` is `true` and
    /// descending otherwise.
    pub fn keys(&self, up: bool) -> Vec<K> {
        let mut out: Vec<(&K, u64)> =
            self.scores.iter().map(|(k, s)| (k, *s)).collect();
        if up {
            out.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        } else {
            out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        }
        out.into_iter().map(|(k, _)| k.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inc_accumulates() {
        let mut s = ScoreMap::new();
        s.inc("a", 2);
        s.inc("b", 1);
        s.inc("a", 4);
        assert_eq!(Some(6), s.get(&"a"));
        assert_eq!(Some(1), s.get(&"b"));
        assert_eq!(None, s.get(&"c"));
        assert_eq!(2, s.len());
    }

    #[test]
    fn keys_ordered_both_ways() {
        let mut s = ScoreMap::new();
        s.inc("mid", 5);
        s.inc("low", 1);
        s.inc("high", 9);
        assert_eq!(vec!["low", "mid", "high"], s.keys(true));
        assert_eq!(vec!["high", "mid", "low"], s.keys(false));
    }

    #[test]
    fn ties_break_on_key() {
        let mut s = ScoreMap::new();
        s.inc("b", 3);
        s.inc("a", 3);
        s.inc("c", 3);
        assert_eq!(vec!["a", "b", "c"], s.keys(true));
        assert_eq!(vec!["a", "b", "c"], s.keys(false));
    }

    #[test]
    fn inc_saturates() {
        let mut s = ScoreMap::new();
        s.inc(1, u64::MAX);
        s.inc(1, 10);
        assert_eq!(Some(u64::MAX), s.get(&1));
    }
}
