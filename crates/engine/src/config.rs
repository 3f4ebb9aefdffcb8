//! Service configuration: the knobs a deployment wires in from its own
//! environment/flag parsing, which is out of scope here.

use rankboard_core::limits::{
    CHANGES_SIZE, CHECK_INTERVAL_SECS, DEFAULT_KV_STORE_PATH, NSQ_IN_FLIGHT, UPPER_THRESHOLD,
};
use std::path::PathBuf;
use std::time::Duration;

/// How score changes reach the registry.
///
/// Exactly one topology is active per running service instance; the choice
/// does not change the wire shape of a `SCORE_CHANGE` message, only who is
/// allowed to write directly to a leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// The RPC facade applies score changes to the registry directly, and
    /// `EventIngestor` is also run to pick up changes published by other
    /// instances (or backfilled from the bus). Suitable for a single
    /// authoritative instance, or one of several that all write locally.
    DirectUpdate,
    /// The RPC facade only publishes to the message bus; the registry is
    /// updated exclusively by `EventIngestor` consuming its own publish.
    /// Suitable for fan-out deployments where every instance should see
    /// every write, including ones made through other instances.
    PublishOnly,
}

impl Topology {
    /// Whether an RPC write should apply directly to the registry.
    pub fn accepts_rpc_writes(self) -> bool {
        matches!(self, Topology::DirectUpdate)
    }

    /// Whether this instance should run an `EventIngestor` consuming the
    /// score-change topic.
    ///
    /// Both topologies ingest from the bus: `DirectUpdate` so a cluster of
    /// instances stays consistent with each other, `PublishOnly` because
    /// the bus is this topology's only path to the registry at all.
    pub fn ingests_from_bus(self) -> bool {
        true
    }
}

/// Service-wide configuration.
///
/// Values default to the constants in `rankboard_core::limits`; a caller
/// assembling a `ServiceConfig` from its own environment is expected to
/// override individual fields rather than rebuild the whole struct.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Path to the embedded KV store's checkpoint file.
    pub kv_store_path: PathBuf,
    /// How often the checkpointer flushes the dirty set.
    pub check_interval: Duration,
    /// Capacity of the checkpointer's pending-name channel.
    pub changes_size: usize,
    /// Max in-flight messages for the message-bus subscription.
    pub nsq_in_flight: usize,
    /// `RankSet` promotion threshold (small → tree).
    pub upper_threshold: usize,
    /// How score changes reach the registry.
    pub topology: Topology,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            kv_store_path: PathBuf::from(DEFAULT_KV_STORE_PATH),
            check_interval: Duration::from_secs(CHECK_INTERVAL_SECS),
            changes_size: CHANGES_SIZE,
            nsq_in_flight: NSQ_IN_FLIGHT,
            upper_threshold: UPPER_THRESHOLD,
            topology: Topology::DirectUpdate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_core_limits() {
        let config = ServiceConfig::default();
        assert_eq!(config.changes_size, CHANGES_SIZE);
        assert_eq!(config.upper_threshold, UPPER_THRESHOLD);
    }

    #[test]
    fn direct_update_accepts_rpc_writes_and_ingests_from_bus() {
        assert!(Topology::DirectUpdate.accepts_rpc_writes());
        assert!(Topology::DirectUpdate.ingests_from_bus());
    }

    #[test]
    fn publish_only_rejects_rpc_writes_but_ingests_from_bus() {
        assert!(!Topology::PublishOnly.accepts_rpc_writes());
        assert!(Topology::PublishOnly.ingests_from_bus());
    }
}
