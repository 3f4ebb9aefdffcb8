//! Request/response types for the three leaderboard operations.

use rankboard_core::entry::{Score, UserId};
use serde::{Deserialize, Serialize};

/// Request for [`RankboardFacade::rank_change`](crate::facade::RankboardFacade::rank_change).
///
/// Also the shape of a `SCORE_CHANGE` bus message, minus the leaderboard
/// name living in the message body rather than the topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankChange {
    /// The leaderboard to update.
    pub name: String,
    /// The user whose score changed.
    pub user_id: UserId,
    /// The user's new score.
    pub score: Score,
}

/// Request for [`RankboardFacade::query_rank_range`](crate::facade::RankboardFacade::query_rank_range).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRankRange<'a> {
    /// The leaderboard to query.
    pub name: &'a str,
    /// 1-based, inclusive start rank.
    pub start: usize,
    /// 1-based, inclusive end rank.
    pub end: usize,
}

/// Request for [`RankboardFacade::query_users`](crate::facade::RankboardFacade::query_users).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryUsers<'a> {
    /// The leaderboard to query.
    pub name: &'a str,
    /// The users to look up, in order. The response carries one entry per
    /// id, in the same order, so callers can zip the two back together.
    pub user_ids: &'a [UserId],
}

/// One row of a rank query result: a user, their score, and their 1-based
/// rank within the leaderboard at the time of the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    /// The user this row describes.
    pub user_id: UserId,
    /// The user's score.
    pub score: Score,
    /// 1-based rank, descending by score.
    pub rank: usize,
}
