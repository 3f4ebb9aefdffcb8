//! OrderIndex: a size-augmented treap over [`ScoreEntry`](rankboard_core::ScoreEntry).
//!
//! A treap (tree + heap) keeps the BST property on `ScoreEntry`'s order and
//! the heap property on randomly assigned node priorities, which keeps the
//! tree balanced in expectation without any rebalancing logic. Every node
//! additionally stores the size of its subtree, so `rank_of`/`select`/`range`
//! all run in expected `O(log n)` instead of the `O(n)` a plain sorted `Vec`
//! would need once a leaderboard is large.
//!
//! Nodes live in a flat arena (`Vec<Node>`) addressed by index rather than
//! behind `Box`/`Rc` pointers — this sidesteps the aliasing issues of a safe
//! parent-pointer tree and keeps deletion a matter of pushing the freed slot
//! onto a free list for reuse.

use rankboard_core::entry::{ScoreEntry, UserId};
use std::cmp::Ordering;

struct Node {
    entry: ScoreEntry,
    left: Option<usize>,
    right: Option<usize>,
    size: usize,
    priority: u64,
}

/// A size-augmented treap ordered by [`ScoreEntry`]'s fixed
/// `(score desc, userId asc)` ordering.
///
/// All positions used by this type are **0-based**, ascending in the entry
/// order — position 0 is the highest score. Callers translate to/from
/// 1-based user-facing ranks.
pub struct OrderIndex {
    nodes: Vec<Node>,
    free: Vec<usize>,
    root: Option<usize>,
    rng: u64,
}

impl OrderIndex {
    /// Build an empty index.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            // Fixed seed: treap balance only needs priorities to be
            // unpredictable relative to insertion order, not
            // cryptographically random, and a fixed seed keeps behavior
            // reproducible across runs for the same input sequence.
            rng: 0x9E3779B97F4A7C15,
        }
    }

    /// Rebuild an index from a batch of entries (used when a [`SmallSet`]
    /// promotes into a tree). Order of `entries` does not matter.
    ///
    /// [`SmallSet`]: crate::small_set::SmallSet
    pub fn from_entries(entries: impl IntoIterator<Item = ScoreEntry>) -> Self {
        let mut idx = Self::new();
        for e in entries {
            idx.insert(e);
        }
        idx
    }

    fn next_priority(&mut self) -> u64 {
        // xorshift64
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.rng = x;
        x
    }

    fn size(&self, idx: Option<usize>) -> usize {
        idx.map(|i| self.nodes[i].size).unwrap_or(0)
    }

    fn update_size(&mut self, idx: usize) {
        let l = self.nodes[idx].left;
        let r = self.nodes[idx].right;
        self.nodes[idx].size = 1 + self.size(l) + self.size(r);
    }

    fn alloc(&mut self, entry: ScoreEntry, priority: u64) -> usize {
        let node = Node {
            entry,
            left: None,
            right: None,
            size: 1,
            priority,
        };
        if let Some(slot) = self.free.pop() {
            self.nodes[slot] = node;
            slot
        } else {
            self.nodes.push(node);
            self.nodes.len() - 1
        }
    }

    fn merge(&mut self, left: Option<usize>, right: Option<usize>) -> Option<usize> {
        match (left, right) {
            (None, r) => r,
            (l, None) => l,
            (Some(l), Some(r)) => {
                if self.nodes[l].priority > self.nodes[r].priority {
                    let right_child = self.nodes[l].right;
                    let merged = self.merge(right_child, Some(r));
                    self.nodes[l].right = merged;
                    self.update_size(l);
                    Some(l)
                } else {
                    let left_child = self.nodes[r].left;
                    let merged = self.merge(Some(l), left_child);
                    self.nodes[r].left = merged;
                    self.update_size(r);
                    Some(r)
                }
            }
        }
    }

    fn search(&self, node: Option<usize>, entry: &ScoreEntry) -> bool {
        match node {
            None => false,
            Some(idx) => match entry.cmp(&self.nodes[idx].entry) {
                Ordering::Less => self.search(self.nodes[idx].left, entry),
                Ordering::Equal => true,
                Ordering::Greater => self.search(self.nodes[idx].right, entry),
            },
        }
    }

    /// Whether an entry with this exact `(user_id, score)` is present.
    pub fn contains(&self, entry: &ScoreEntry) -> bool {
        self.search(self.root, entry)
    }

    #[cfg(debug_assertions)]
    fn contains_user_id(&self, user_id: UserId) -> bool {
        self.to_vec().iter().any(|e| e.user_id == user_id)
    }

    /// Insert a new entry.
    ///
    /// # Panics (debug builds only)
    /// Panics if an entry for this `user_id` already exists under a
    /// different score. Callers must remove the stale entry first — see
    /// `RankSet::update`, which always migrates/removes before inserting.
    pub fn insert(&mut self, entry: ScoreEntry) {
        debug_assert!(
            !self.contains_user_id(entry.user_id),
            "OrderIndex::insert called with user_id {} already present; remove the stale entry first",
            entry.user_id
        );
        let priority = self.next_priority();
        let (left, right) = self.split(self.root, &entry);
        let node = self.alloc(entry, priority);
        let merged = self.merge(left, Some(node));
        self.root = self.merge(merged, right);
    }

    fn split(&mut self, node: Option<usize>, entry: &ScoreEntry) -> (Option<usize>, Option<usize>) {
        match node {
            None => (None, None),
            Some(idx) => {
                if self.nodes[idx].entry < *entry {
                    let right = self.nodes[idx].right;
                    let (l, r) = self.split(right, entry);
                    self.nodes[idx].right = l;
                    self.update_size(idx);
                    (Some(idx), r)
                } else {
                    let left = self.nodes[idx].left;
                    let (l, r) = self.split(left, entry);
                    self.nodes[idx].left = r;
                    self.update_size(idx);
                    (l, Some(idx))
                }
            }
        }
    }

    fn delete(&mut self, node: Option<usize>, entry: &ScoreEntry) -> (Option<usize>, bool) {
        match node {
            None => (None, false),
            Some(idx) => match entry.cmp(&self.nodes[idx].entry) {
                Ordering::Less => {
                    let left = self.nodes[idx].left;
                    let (new_left, found) = self.delete(left, entry);
                    self.nodes[idx].left = new_left;
                    if found {
                        self.update_size(idx);
                    }
                    (Some(idx), found)
                }
                Ordering::Greater => {
                    let right = self.nodes[idx].right;
                    let (new_right, found) = self.delete(right, entry);
                    self.nodes[idx].right = new_right;
                    if found {
                        self.update_size(idx);
                    }
                    (Some(idx), found)
                }
                Ordering::Equal => {
                    let left = self.nodes[idx].left;
                    let right = self.nodes[idx].right;
                    self.free.push(idx);
                    (self.merge(left, right), true)
                }
            },
        }
    }

    /// Remove an entry. Returns `false` if it was not present.
    pub fn remove(&mut self, entry: &ScoreEntry) -> bool {
        let (new_root, found) = self.delete(self.root, entry);
        self.root = new_root;
        found
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.size(self.root)
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    fn rank_recursive(&self, node: Option<usize>, entry: &ScoreEntry) -> usize {
        match node {
            None => 0,
            Some(idx) => match entry.cmp(&self.nodes[idx].entry) {
                Ordering::Less => self.rank_recursive(self.nodes[idx].left, entry),
                Ordering::Equal => self.size(self.nodes[idx].left),
                Ordering::Greater => {
                    1 + self.size(self.nodes[idx].left) + self.rank_recursive(self.nodes[idx].right, entry)
                }
            },
        }
    }

    /// 0-based position of `entry` in ascending order, or `None` if absent.
    pub fn rank_of(&self, entry: &ScoreEntry) -> Option<usize> {
        if self.contains(entry) {
            Some(self.rank_recursive(self.root, entry))
        } else {
            None
        }
    }

    fn select_recursive(&self, node: Option<usize>, k: usize) -> Option<ScoreEntry> {
        let idx = node?;
        let left_size = self.size(self.nodes[idx].left);
        match k.cmp(&left_size) {
            Ordering::Less => self.select_recursive(self.nodes[idx].left, k),
            Ordering::Equal => Some(self.nodes[idx].entry),
            Ordering::Greater => self.select_recursive(self.nodes[idx].right, k - left_size - 1),
        }
    }

    /// The entry at 0-based position `pos`, or `None` if out of range.
    pub fn select(&self, pos: usize) -> Option<ScoreEntry> {
        self.select_recursive(self.root, pos)
    }

    fn collect_range(&self, node: Option<usize>, lo: usize, hi: usize, out: &mut Vec<ScoreEntry>) {
        let idx = match node {
            Some(i) => i,
            None => return,
        };
        let left_size = self.size(self.nodes[idx].left);
        if lo < left_size {
            let sub_hi = hi.min(left_size.saturating_sub(1));
            self.collect_range(self.nodes[idx].left, lo, sub_hi, out);
        }
        if lo <= left_size && left_size <= hi {
            out.push(self.nodes[idx].entry);
        }
        if hi > left_size {
            let new_lo = lo.saturating_sub(left_size + 1);
            let new_hi = hi - left_size - 1;
            self.collect_range(self.nodes[idx].right, new_lo, new_hi, out);
        }
    }

    /// Entries at 0-based positions `[start, end]`, clamped to the index's
    /// bounds. Returns an empty `Vec` if `start > end` or the index is
    /// empty.
    pub fn range(&self, start: usize, end: usize) -> Vec<ScoreEntry> {
        if self.is_empty() || start > end || start >= self.len() {
            return Vec::new();
        }
        let end = end.min(self.len() - 1);
        let mut out = Vec::with_capacity(end - start + 1);
        self.collect_range(self.root, start, end, &mut out);
        out
    }

    fn in_order(&self, node: Option<usize>, out: &mut Vec<ScoreEntry>) {
        if let Some(idx) = node {
            self.in_order(self.nodes[idx].left, out);
            out.push(self.nodes[idx].entry);
            self.in_order(self.nodes[idx].right, out);
        }
    }

    /// All entries in ascending order. Used for migration between
    /// representations and for checkpoint serialization.
    pub fn to_vec(&self) -> Vec<ScoreEntry> {
        let mut out = Vec::with_capacity(self.len());
        self.in_order(self.root, &mut out);
        out
    }
}

impl Default for OrderIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn build(pairs: &[(i32, i32)]) -> OrderIndex {
        let mut idx = OrderIndex::new();
        for &(user_id, score) in pairs {
            idx.insert(ScoreEntry::new(user_id, score));
        }
        idx
    }

    #[test]
    fn empty_index_has_no_entries() {
        let idx = OrderIndex::new();
        assert_eq!(idx.len(), 0);
        assert!(idx.is_empty());
        assert_eq!(idx.select(0), None);
    }

    #[test]
    fn rank_matches_score_descending_order() {
        let idx = build(&[(1, 10), (2, 30), (3, 20)]);
        assert_eq!(idx.select(0), Some(ScoreEntry::new(2, 30)));
        assert_eq!(idx.select(1), Some(ScoreEntry::new(3, 20)));
        assert_eq!(idx.select(2), Some(ScoreEntry::new(1, 10)));
        assert_eq!(idx.rank_of(&ScoreEntry::new(2, 30)), Some(0));
        assert_eq!(idx.rank_of(&ScoreEntry::new(1, 10)), Some(2));
    }

    #[test]
    fn ties_break_by_ascending_user_id() {
        let idx = build(&[(5, 100), (2, 100), (8, 100)]);
        let ordered: Vec<_> = idx.to_vec().iter().map(|e| e.user_id).collect();
        assert_eq!(ordered, vec![2, 5, 8]);
    }

    #[test]
    fn remove_drops_entry_and_shifts_ranks() {
        let mut idx = build(&[(1, 10), (2, 30), (3, 20)]);
        assert!(idx.remove(&ScoreEntry::new(2, 30)));
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.select(0), Some(ScoreEntry::new(3, 20)));
        assert!(!idx.remove(&ScoreEntry::new(2, 30)));
    }

    #[test]
    fn range_clamps_to_bounds() {
        let idx = build(&[(1, 10), (2, 30), (3, 20), (4, 40)]);
        let top_two: Vec<_> = idx.range(0, 1).iter().map(|e| e.user_id).collect();
        assert_eq!(top_two, vec![4, 2]);
        let overrun: Vec<_> = idx.range(2, 100).iter().map(|e| e.user_id).collect();
        assert_eq!(overrun, vec![3, 1]);
        assert!(idx.range(5, 10).is_empty());
    }

    #[test]
    #[should_panic(expected = "already present")]
    fn insert_panics_on_duplicate_user_in_debug() {
        let mut idx = OrderIndex::new();
        idx.insert(ScoreEntry::new(1, 10));
        idx.insert(ScoreEntry::new(1, 20));
    }

    proptest! {
        #[test]
        fn select_and_rank_agree_with_sorted_reference(
            mut pairs in proptest::collection::vec((0i32..2000, -1000i32..1000), 0..200)
        ) {
            // Dedup user_ids, since OrderIndex requires unique users.
            pairs.sort_by_key(|&(u, _)| u);
            pairs.dedup_by_key(|&mut (u, _)| u);

            let mut idx = OrderIndex::new();
            let mut entries: Vec<ScoreEntry> = Vec::new();
            for (user_id, score) in pairs {
                let e = ScoreEntry::new(user_id, score);
                idx.insert(e);
                entries.push(e);
            }
            entries.sort();

            prop_assert_eq!(idx.len(), entries.len());
            for (pos, expected) in entries.iter().enumerate() {
                prop_assert_eq!(idx.select(pos), Some(*expected));
                prop_assert_eq!(idx.rank_of(expected), Some(pos));
            }
        }

        #[test]
        fn range_matches_sorted_slice(
            mut pairs in proptest::collection::vec((0i32..500, -500i32..500), 0..100),
            start in 0usize..100,
            len in 0usize..100,
        ) {
            pairs.sort_by_key(|&(u, _)| u);
            pairs.dedup_by_key(|&mut (u, _)| u);

            let mut idx = OrderIndex::new();
            let mut entries: Vec<ScoreEntry> = Vec::new();
            for (user_id, score) in pairs {
                let e = ScoreEntry::new(user_id, score);
                idx.insert(e);
                entries.push(e);
            }
            entries.sort();

            let end = start.saturating_add(len);
            let expected: Vec<ScoreEntry> = entries
                .iter()
                .copied()
                .enumerate()
                .filter(|(i, _)| *i >= start && *i <= end)
                .map(|(_, e)| e)
                .collect();
            prop_assert_eq!(idx.range(start, end), expected);
        }
    }
}
