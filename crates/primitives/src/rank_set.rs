//! RankSet: the hybrid, size-adaptive container backing one named
//! leaderboard.
//!
//! A `RankSet` starts life as a [`SmallSet`] and promotes to an
//! [`OrderIndex`] once its population crosses `UPPER_THRESHOLD`. There is no
//! corresponding demotion path back to `SmallSet` — once a leaderboard has
//! been large, staying on the tree is cheap and avoids the flip-flopping a
//! demotion rule would need to guard against near the threshold. The
//! `LOWER_THRESHOLD` constant is kept (see
//! [`rankboard_core::limits`]) purely to document the hysteresis gap a
//! demotion rule would use, should one be added later.
//!
//! A `RankSet` is not itself thread-safe; callers (the `Registry`) wrap it
//! in a lock.

use rankboard_core::entry::{Score, ScoreEntry, UserId};
use rankboard_core::limits::UPPER_THRESHOLD;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::order_index::OrderIndex;
use crate::small_set::SmallSet;

enum Representation {
    Small(SmallSet),
    Tree(OrderIndex),
}

/// A single leaderboard: a hybrid ordered set of `(userId, score)` plus an
/// O(1) `userId -> score` index for point lookups.
pub struct RankSet {
    repr: Representation,
    scores: FxHashMap<UserId, Score>,
    upper_threshold: usize,
}

/// Checkpoint-friendly snapshot of a `RankSet`'s contents.
///
/// Deliberately does not record which representation was active — on
/// restore a `RankSet` is rebuilt via [`RankSet::update`] one entry at a
/// time, so it promotes to a tree exactly as it would have during normal
/// operation if the population warrants it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankSetSnapshot {
    /// All `(userId, score)` pairs, unordered.
    pub scores: FxHashMap<UserId, Score>,
}

impl RankSet {
    /// Build an empty leaderboard, promoting to a tree past the default
    /// [`UPPER_THRESHOLD`](rankboard_core::limits::UPPER_THRESHOLD).
    pub fn new() -> Self {
        Self::with_upper_threshold(UPPER_THRESHOLD)
    }

    /// Build an empty leaderboard that promotes to a tree once its
    /// population would exceed `upper_threshold`.
    pub fn with_upper_threshold(upper_threshold: usize) -> Self {
        Self {
            repr: Representation::Small(SmallSet::new()),
            scores: FxHashMap::default(),
            upper_threshold,
        }
    }

    /// Number of distinct users with a recorded score.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether the leaderboard has no entries.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// The user's current score, if they have one.
    pub fn score_of(&self, user_id: UserId) -> Option<Score> {
        self.scores.get(&user_id).copied()
    }

    /// Set `user_id`'s score to `score`, inserting the user if new.
    ///
    /// A no-op write (new score equals the existing score) skips both the
    /// remove and the insert — updates are idempotent (spec invariant 6:
    /// replaying the same update twice leaves the leaderboard unchanged).
    pub fn update(&mut self, user_id: UserId, score: Score) {
        if let Some(&old_score) = self.scores.get(&user_id) {
            if old_score == score {
                return;
            }
            let old_entry = ScoreEntry::new(user_id, old_score);
            match &mut self.repr {
                Representation::Small(s) => {
                    s.remove(&old_entry);
                }
                Representation::Tree(t) => {
                    t.remove(&old_entry);
                }
            }
        }
        self.scores.insert(user_id, score);

        // Promote before inserting the new entry, not after. Promoting
        // after insertion would migrate a SmallSet that already contains
        // the triggering entry into a fresh OrderIndex built from
        // `to_vec()` — harmless on its own, but it makes "does this entry
        // exist yet" depend on which side of promotion we're on mid-update,
        // which is exactly the ambiguity this ordering avoids.
        self.maybe_promote();

        let entry = ScoreEntry::new(user_id, score);
        match &mut self.repr {
            Representation::Small(s) => s.insert(entry),
            Representation::Tree(t) => t.insert(entry),
        }
    }

    fn maybe_promote(&mut self) {
        if let Representation::Small(small) = &self.repr {
            if small.len() + 1 > self.upper_threshold {
                let entries = small.to_vec();
                tracing::debug!(
                    size = entries.len(),
                    threshold = self.upper_threshold,
                    "promoting leaderboard from SmallSet to OrderIndex"
                );
                self.repr = Representation::Tree(OrderIndex::from_entries(entries));
            }
        }
    }

    /// The user's 1-based rank and current score, or `None` if they have no
    /// recorded score.
    pub fn rank_of(&self, user_id: UserId) -> Option<(usize, Score)> {
        let score = *self.scores.get(&user_id)?;
        let entry = ScoreEntry::new(user_id, score);
        let pos = match &self.repr {
            Representation::Small(s) => s.rank_of(&entry),
            Representation::Tree(t) => t.rank_of(&entry),
        }?;
        Some((pos + 1, score))
    }

    /// Entries ranked `[start, end]` (1-based, inclusive, descending by
    /// score), clamped to the leaderboard's actual size.
    pub fn range(&self, start: usize, end: usize) -> Vec<ScoreEntry> {
        if start == 0 || end == 0 || start > end || start > self.len() {
            return Vec::new();
        }
        let (lo, hi) = (start - 1, end - 1);
        match &self.repr {
            Representation::Small(s) => s.range(lo, hi),
            Representation::Tree(t) => t.range(lo, hi),
        }
    }

    /// All entries in descending rank order.
    pub fn to_vec(&self) -> Vec<ScoreEntry> {
        match &self.repr {
            Representation::Small(s) => s.to_vec(),
            Representation::Tree(t) => t.to_vec(),
        }
    }

    /// Serialize for checkpointing.
    pub fn marshal(&self) -> RankSetSnapshot {
        RankSetSnapshot {
            scores: self.scores.clone(),
        }
    }

    /// Rebuild a `RankSet` from a checkpoint snapshot, promoting to a tree
    /// past the default [`UPPER_THRESHOLD`](rankboard_core::limits::UPPER_THRESHOLD).
    pub fn unmarshal(snapshot: RankSetSnapshot) -> Self {
        Self::unmarshal_with_threshold(snapshot, UPPER_THRESHOLD)
    }

    /// Rebuild a `RankSet` from a checkpoint snapshot, promoting to a tree
    /// once its restored population would exceed `upper_threshold`.
    pub fn unmarshal_with_threshold(snapshot: RankSetSnapshot, upper_threshold: usize) -> Self {
        let mut rank_set = Self::with_upper_threshold(upper_threshold);
        for (user_id, score) in snapshot.scores {
            rank_set.update(user_id, score);
        }
        rank_set
    }
}

impl Default for RankSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankboard_core::limits::UPPER_THRESHOLD;

    #[test]
    fn update_then_query_round_trips() {
        let mut rs = RankSet::new();
        rs.update(1, 10);
        rs.update(2, 30);
        rs.update(3, 20);
        assert_eq!(rs.rank_of(2), Some((1, 30)));
        assert_eq!(rs.rank_of(1), Some((3, 10)));
        assert_eq!(rs.rank_of(99), None);
    }

    #[test]
    fn repeated_identical_update_is_idempotent() {
        let mut rs = RankSet::new();
        rs.update(1, 10);
        rs.update(1, 10);
        assert_eq!(rs.len(), 1);
        assert_eq!(rs.rank_of(1), Some((1, 10)));
    }

    #[test]
    fn rescoring_a_user_moves_their_rank() {
        let mut rs = RankSet::new();
        rs.update(1, 10);
        rs.update(2, 20);
        assert_eq!(rs.rank_of(1), Some((2, 10)));
        rs.update(1, 30);
        assert_eq!(rs.rank_of(1), Some((1, 30)));
        assert_eq!(rs.len(), 2);
    }

    #[test]
    fn range_is_one_based_and_clamped() {
        let mut rs = RankSet::new();
        for (user_id, score) in [(1, 10), (2, 30), (3, 20), (4, 40)] {
            rs.update(user_id, score);
        }
        let top_two: Vec<_> = rs.range(1, 2).iter().map(|e| e.user_id).collect();
        assert_eq!(top_two, vec![4, 2]);
        assert!(rs.range(0, 2).is_empty());
        let overrun: Vec<_> = rs.range(3, 100).iter().map(|e| e.user_id).collect();
        assert_eq!(overrun, vec![3, 1]);
        assert!(rs.range(5, 10).is_empty());
    }

    #[test]
    fn custom_upper_threshold_promotes_earlier() {
        let mut rs = RankSet::with_upper_threshold(2);
        rs.update(1, 10);
        rs.update(2, 20);
        assert!(matches!(rs.repr, Representation::Small(_)));
        rs.update(3, 30);
        assert!(matches!(rs.repr, Representation::Tree(_)));
    }

    #[test]
    fn promotes_to_tree_past_upper_threshold() {
        let mut rs = RankSet::new();
        for user_id in 0..=(UPPER_THRESHOLD as i32) {
            rs.update(user_id, user_id);
        }
        assert!(matches!(rs.repr, Representation::Tree(_)));
        assert_eq!(rs.len(), UPPER_THRESHOLD + 1);
        assert_eq!(rs.rank_of(UPPER_THRESHOLD as i32), Some((1, UPPER_THRESHOLD as i32)));
    }

    #[test]
    fn marshal_unmarshal_round_trips() {
        let mut rs = RankSet::new();
        for (user_id, score) in [(1, 10), (2, 30), (3, 20)] {
            rs.update(user_id, score);
        }
        let snapshot = rs.marshal();
        let restored = RankSet::unmarshal(snapshot);
        assert_eq!(restored.len(), 3);
        assert_eq!(restored.rank_of(2), Some((1, 30)));
    }
}
