//! The RPC-facing facade: exactly the three operations a leaderboard
//! service exposes externally.
//!
//! Mirrors the trait-plus-concrete-implementation split elsewhere in this
//! stack — `RankboardFacade` is the contract an RPC transport (gRPC,
//! Thrift, whatever; wiring one is out of scope) is written against,
//! and [`FacadeImpl`] is the one real implementation.

use rankboard_core::error::RankError;
use rankboard_core::name::LeaderboardName;
use rankboard_core::RankResult;

use crate::types::{QueryRankRange, QueryUsers, RankChange, RankEntry};

/// The three operations a leaderboard service exposes.
pub trait RankboardFacade {
    /// Apply a score change, creating the named leaderboard if it does not
    /// exist yet.
    fn rank_change(&self, change: RankChange) -> RankResult<()>;

    /// List the entries ranked `[start, end]` (1-based, inclusive,
    /// descending by score).
    ///
    /// # Errors
    /// [`RankError::NameNotExists`] if the leaderboard has never been
    /// written to.
    fn query_rank_range(&self, query: QueryRankRange<'_>) -> RankResult<Vec<RankEntry>>;

    /// Look up the rank and score of each of `query.user_ids`, in order.
    ///
    /// A user with no recorded score is represented as `None` at their
    /// position in the returned vector, rather than the sentinel
    /// `(rank=0, score=0)` the wire protocol uses — unrepresentable states
    /// should be unrepresentable in the Rust type, not encoded as a magic
    /// value callers have to remember to check for.
    ///
    /// # Errors
    /// [`RankError::NameNotExists`] if the leaderboard has never been
    /// written to.
    fn query_users(&self, query: QueryUsers<'_>) -> RankResult<Vec<Option<RankEntry>>>;
}

/// The concrete [`RankboardFacade`] implementation, backed by a
/// [`Registry`](rankboard_concurrency::Registry) and a
/// [`DirtyMarker`](rankboard_durability::DirtyMarker).
pub struct FacadeImpl {
    registry: std::sync::Arc<rankboard_concurrency::Registry>,
    dirty: rankboard_durability::DirtyMarker,
}

impl FacadeImpl {
    /// Build a facade over `registry`, marking leaderboards dirty on
    /// `dirty` after every successful write.
    pub fn new(
        registry: std::sync::Arc<rankboard_concurrency::Registry>,
        dirty: rankboard_durability::DirtyMarker,
    ) -> Self {
        Self { registry, dirty }
    }
}

impl RankboardFacade for FacadeImpl {
    fn rank_change(&self, change: RankChange) -> RankResult<()> {
        let name = LeaderboardName::new(change.name)?;
        let board = self.registry.get_or_create(&name);
        board.write().update(change.user_id, change.score);
        self.dirty.mark(name);
        Ok(())
    }

    fn query_rank_range(&self, query: QueryRankRange<'_>) -> RankResult<Vec<RankEntry>> {
        let name = LeaderboardName::new(query.name)?;
        let board = self.registry.get(&name).ok_or_else(|| RankError::NameNotExists {
            name: name.to_string(),
        })?;
        let guard = board.read();
        let entries = guard.range(query.start, query.end);
        let start = query.start.max(1);
        Ok(entries
            .into_iter()
            .enumerate()
            .map(|(i, e)| RankEntry {
                user_id: e.user_id,
                score: e.score,
                rank: start + i,
            })
            .collect())
    }

    fn query_users(&self, query: QueryUsers<'_>) -> RankResult<Vec<Option<RankEntry>>> {
        let name = LeaderboardName::new(query.name)?;
        let board = self.registry.get(&name).ok_or_else(|| RankError::NameNotExists {
            name: name.to_string(),
        })?;
        let guard = board.read();
        Ok(query
            .user_ids
            .iter()
            .map(|&user_id| {
                guard.rank_of(user_id).map(|(rank, score)| RankEntry {
                    user_id,
                    score,
                    rank,
                })
            })
            .collect())
    }
}
