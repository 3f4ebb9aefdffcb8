//! EventIngestor: applies `SCORE_CHANGE` messages from the bus to the
//! registry.
//!
//! Every instance subscribes under its own ephemeral channel
//! (`RANK<uuid>#ephemeral`) rather than a shared, durable channel name, so
//! that every running instance observes every published message — the bus
//! fans out to all ephemeral channels of a topic rather than load-balancing
//! across them the way a shared channel would.

use std::sync::Arc;

use rankboard_api::RankChange;
use rankboard_concurrency::Registry;
use rankboard_core::name::LeaderboardName;
use rankboard_durability::DirtyMarker;
use tokio::sync::mpsc;
use tokio::sync::watch;

use crate::collaborators::{MessageBusConsumer, UuidSource};

/// Consumes `SCORE_CHANGE` messages and applies them to a [`Registry`].
pub struct EventIngestor<B: MessageBusConsumer> {
    bus: Arc<B>,
    registry: Arc<Registry>,
    dirty: DirtyMarker,
}

impl<B: MessageBusConsumer> EventIngestor<B> {
    /// Build an ingestor over `bus`, applying decoded changes to `registry`
    /// and marking each updated leaderboard dirty on `dirty`.
    pub fn new(bus: Arc<B>, registry: Arc<Registry>, dirty: DirtyMarker) -> Self {
        Self { bus, registry, dirty }
    }

    /// Subscribe to `topic` under a fresh ephemeral channel minted from
    /// `uuid_source`, and run the consume loop until `shutdown` fires.
    pub async fn run(
        &self,
        topic: &str,
        in_flight: usize,
        uuid_source: &dyn UuidSource,
        shutdown: watch::Receiver<bool>,
    ) -> rankboard_core::RankResult<()> {
        let channel_name = format!("RANK{}#ephemeral", uuid_source.new_uuid());
        let rx = self.bus.subscribe(topic, &channel_name, in_flight)?;
        self.consume(rx, shutdown).await;
        Ok(())
    }

    async fn consume(&self, mut rx: mpsc::Receiver<Vec<u8>>, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                message = rx.recv() => {
                    match message {
                        Some(payload) => self.apply(&payload),
                        None => break,
                    }
                }
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }

    /// Decode one message and apply it. A message that fails to decode is
    /// logged and dropped, never retried — the bus has no notion of a dead
    /// letter queue in this design, and a malformed message will never
    /// decode successfully no matter how many times it is redelivered.
    fn apply(&self, payload: &[u8]) {
        let change: RankChange = match rmp_serde::from_slice(payload) {
            Ok(change) => change,
            Err(e) => {
                tracing::warn!(error = %e, "failed to decode SCORE_CHANGE message, dropping");
                return;
            }
        };

        let name = match LeaderboardName::new(change.name) {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(error = %e, "SCORE_CHANGE message named an invalid leaderboard, dropping");
                return;
            }
        };

        let board = self.registry.get_or_create(&name);
        board.write().update(change.user_id, change.score);
        self.dirty.mark(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::InProcessBus;
    use rankboard_core::limits::UPPER_THRESHOLD;
    use rankboard_durability::{Checkpointer, FileKvStore};
    use std::time::Duration;

    fn ingestor() -> (EventIngestor<InProcessBus>, Arc<InProcessBus>, Arc<Registry>) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileKvStore::new(dir.path().join("RANK-DUMP.DAT")));
        let registry = Arc::new(Registry::new());
        let (_checkpointer, marker, _rx) =
            Checkpointer::new(store, registry.clone(), 16, Duration::from_secs(10), UPPER_THRESHOLD);
        std::mem::forget(dir);
        let bus = Arc::new(InProcessBus::new());
        (
            EventIngestor::new(bus.clone(), registry.clone(), marker),
            bus,
            registry,
        )
    }

    #[tokio::test]
    async fn applies_well_formed_message_to_registry() {
        let (ingestor, _bus, registry) = ingestor();
        let (_tx, rx) = mpsc::channel::<Vec<u8>>(8);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let change = RankChange {
            name: "season-3".to_string(),
            user_id: 1,
            score: 42,
        };
        ingestor.apply(&rmp_serde::to_vec(&change).unwrap());

        let name = LeaderboardName::new("season-3").unwrap();
        assert_eq!(registry.get(&name).unwrap().read().score_of(1), Some(42));

        drop(shutdown_tx);
        drop(rx);
    }

    #[tokio::test]
    async fn malformed_message_is_dropped_without_panicking() {
        let (ingestor, _bus, registry) = ingestor();
        ingestor.apply(b"not valid msgpack");
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn run_consumes_until_shutdown_signaled() {
        let (ingestor, bus, registry) = ingestor();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let uuid_source = crate::collaborators::RandomUuidSource;

        let run_handle = {
            let registry_check = registry.clone();
            tokio::spawn(async move {
                ingestor.run("SCORE_CHANGE", 8, &uuid_source, shutdown_rx).await.unwrap();
                registry_check
            })
        };

        // give the subscription a moment to register before publishing
        tokio::task::yield_now().await;
        let change = RankChange {
            name: "season-3".to_string(),
            user_id: 9,
            score: 99,
        };
        bus.publish("SCORE_CHANGE", rmp_serde::to_vec(&change).unwrap());
        tokio::task::yield_now().await;

        shutdown_tx.send(true).unwrap();
        let registry = run_handle.await.unwrap();
        let name = LeaderboardName::new("season-3").unwrap();
        assert_eq!(registry.get(&name).unwrap().read().score_of(9), Some(99));
    }
}
