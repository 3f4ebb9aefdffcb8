//! Registry: the name-keyed map of leaderboards.
//!
//! Every leaderboard lives behind its own `parking_lot::RwLock`, so a write
//! to `"season-3"` never blocks a read of `"season-4"`. The map itself is a
//! `DashMap`, whose internal shard locks give lazy, double-checked creation
//! of a new leaderboard's entry for free through `entry().or_insert_with()`
//! — the same per-key-lock-in-a-concurrent-map shape the durability layer
//! uses for its own commit locks.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use rankboard_core::limits::UPPER_THRESHOLD;
use rankboard_core::name::LeaderboardName;
use rankboard_primitives::RankSet;

/// A leaderboard handle: a name paired with the lock guarding its
/// `RankSet`.
pub type BoardHandle = Arc<RwLock<RankSet>>;

/// Multiplexes any number of independent, concurrently accessible
/// leaderboards by name.
///
/// A `Registry` is typically wrapped in an `Arc` and shared across the RPC
/// facade, the event ingestor, and the checkpointer.
pub struct Registry {
    boards: DashMap<LeaderboardName, BoardHandle>,
    upper_threshold: usize,
}

impl Registry {
    /// Build an empty registry. New leaderboards promote to a tree past the
    /// default `UPPER_THRESHOLD`.
    pub fn new() -> Self {
        Self::with_upper_threshold(UPPER_THRESHOLD)
    }

    /// Build an empty registry whose leaderboards promote to a tree once
    /// their population would exceed `upper_threshold`.
    pub fn with_upper_threshold(upper_threshold: usize) -> Self {
        Self {
            boards: DashMap::new(),
            upper_threshold,
        }
    }

    /// Fetch the leaderboard named `name`, creating an empty one if it does
    /// not exist yet.
    ///
    /// Never holds a lock on the `RankSet` itself — only the map's
    /// per-shard lock is touched here, and only for as long as the entry
    /// lookup/insert takes. Callers lock the returned handle separately.
    pub fn get_or_create(&self, name: &LeaderboardName) -> BoardHandle {
        let upper_threshold = self.upper_threshold;
        self.boards
            .entry(name.clone())
            .or_insert_with(|| {
                tracing::debug!(leaderboard = %name, "creating new leaderboard");
                Arc::new(RwLock::new(RankSet::with_upper_threshold(upper_threshold)))
            })
            .clone()
    }

    /// Fetch the leaderboard named `name`, or `None` if it has never been
    /// written to.
    pub fn get(&self, name: &LeaderboardName) -> Option<BoardHandle> {
        self.boards.get(name).map(|entry| entry.clone())
    }

    /// Install a leaderboard directly, overwriting any existing one with
    /// the same name. Used by the checkpointer to restore state on boot.
    pub fn restore(&self, name: LeaderboardName, rank_set: RankSet) {
        self.boards.insert(name, Arc::new(RwLock::new(rank_set)));
    }

    /// All leaderboard names currently known to the registry.
    pub fn names(&self) -> Vec<LeaderboardName> {
        self.boards.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of leaderboards currently known to the registry.
    pub fn len(&self) -> usize {
        self.boards.len()
    }

    /// Whether the registry holds no leaderboards.
    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
