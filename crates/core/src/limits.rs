//! Tunable constants shared by every crate in this stack.
//!
//! These are compile-time defaults. `rankboard-engine::config::ServiceConfig`
//! exposes them as overridable fields; the constants here are what a fresh
//! `ServiceConfig::default()` uses.

/// Promote a RankSet from SmallSet to OrderIndex once its size would exceed
/// this threshold.
pub const UPPER_THRESHOLD: usize = 4096;

/// Demotion watermark (tree → small). No code path currently triggers
/// demotion — see DESIGN.md — but the constant is kept for API completeness
/// and so the hysteresis gap between the two thresholds stays documented.
pub const LOWER_THRESHOLD: usize = 2048;

/// Capacity of the Checkpointer's pending-name channel.
pub const CHANGES_SIZE: usize = 65536;

/// How often the Checkpointer flushes the dirty set, in seconds.
pub const CHECK_INTERVAL_SECS: u64 = 10;

/// Max in-flight messages for the message-bus subscription.
pub const NSQ_IN_FLIGHT: usize = 128;

/// Default path for the embedded KV store file.
pub const DEFAULT_KV_STORE_PATH: &str = "/data/RANK-DUMP.DAT";

/// The single bucket name within the KV store.
pub const KV_BUCKET_NAME: &str = "RANKING";

/// The message-bus topic carrying score-change events.
pub const SCORE_CHANGE_TOPIC: &str = "SCORE_CHANGE";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hysteresis_gap_is_positive() {
        assert!(UPPER_THRESHOLD > LOWER_THRESHOLD);
    }
}
