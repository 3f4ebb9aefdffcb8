//! Collaborator contracts: the external systems rankboard depends on but
//! does not implement.
//!
//! Wiring a real message bus (NSQ, Kafka, ...) or service-discovery client
//! is out of scope. These traits are the seam; each ships with an
//! in-process implementation suitable for tests and small deployments, and
//! a no-op implementation where "doing nothing" is a legitimate choice
//! (service discovery is optional for a single-process deployment).

use rankboard_core::error::RankError;
use rankboard_core::RankResult;
use std::sync::Mutex;
use tokio::sync::mpsc;
use uuid::Uuid;

/// A source of fresh UUIDs, used to mint the ephemeral channel name the
/// event ingestor subscribes under (`RANK<uuid>#ephemeral`).
pub trait UuidSource: Send + Sync {
    /// Produce a new, unique UUID.
    fn new_uuid(&self) -> Uuid;
}

/// Mints real v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomUuidSource;

impl UuidSource for RandomUuidSource {
    fn new_uuid(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// The message-bus consumer side: subscribing to a topic under a named
/// channel and receiving raw message bytes.
///
/// Message acknowledgement is implicit in this contract: once a message is
/// yielded from the receiver, it is considered delivered. A production bus
/// client would additionally require explicit ack/nack; that machinery is
/// out of scope here, since `EventIngestor` never retries a message it
/// fails to decode (it logs and moves on — see spec'd edge-case handling).
pub trait MessageBusConsumer: Send + Sync {
    /// Subscribe to `topic` under `channel_name`, allowing up to
    /// `in_flight` messages to be buffered before the sender should start
    /// applying backpressure.
    fn subscribe(
        &self,
        topic: &str,
        channel_name: &str,
        in_flight: usize,
    ) -> RankResult<mpsc::Receiver<Vec<u8>>>;
}

/// An in-process message bus: topics are named channels, `publish` feeds
/// every current subscriber of a topic. Suitable for tests and
/// single-process deployments; a real deployment would subscribe this
/// trait to an actual message-bus client instead.
#[derive(Default)]
pub struct InProcessBus {
    subscribers: Mutex<Vec<(String, mpsc::Sender<Vec<u8>>)>>,
}

impl InProcessBus {
    /// Build a bus with no subscribers yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `payload` to every current subscriber of `topic`.
    ///
    /// Subscribers whose channel is full are skipped with a warning rather
    /// than blocking the publisher — the same load-shedding policy the
    /// checkpointer's dirty-mark channel uses.
    pub fn publish(&self, topic: &str, payload: Vec<u8>) {
        let subscribers = self.subscribers.lock().expect("InProcessBus mutex poisoned");
        for (sub_topic, tx) in subscribers.iter() {
            if sub_topic == topic {
                if tx.try_send(payload.clone()).is_err() {
                    tracing::warn!(topic, "subscriber channel full, dropping message");
                }
            }
        }
    }
}

impl MessageBusConsumer for InProcessBus {
    fn subscribe(
        &self,
        topic: &str,
        channel_name: &str,
        in_flight: usize,
    ) -> RankResult<mpsc::Receiver<Vec<u8>>> {
        let (tx, rx) = mpsc::channel(in_flight.max(1));
        let mut subscribers = self.subscribers.lock().map_err(|_| RankError::Transport {
            message: "InProcessBus mutex poisoned".to_string(),
        })?;
        tracing::debug!(topic, channel_name, "subscribed to topic");
        subscribers.push((topic.to_string(), tx));
        Ok(rx)
    }
}

/// A service-discovery client for registering this instance so RPC clients
/// can find it. Real registration is out of scope; the no-op
/// implementation is a legitimate choice for a single, statically
/// addressed deployment.
pub trait DiscoveryClient: Send + Sync {
    /// Register `service_name` as reachable at this instance.
    fn register(&self, service_name: &str) -> RankResult<()>;
}

/// A [`DiscoveryClient`] that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDiscoveryClient;

impl DiscoveryClient for NoopDiscoveryClient {
    fn register(&self, service_name: &str) -> RankResult<()> {
        tracing::debug!(service_name, "discovery registration skipped (no-op client)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_process_bus_delivers_published_messages() {
        let bus = InProcessBus::new();
        let mut rx = bus.subscribe("SCORE_CHANGE", "RANKtest#ephemeral", 8).unwrap();
        bus.publish("SCORE_CHANGE", b"payload".to_vec());
        let received = rx.recv().await.unwrap();
        assert_eq!(received, b"payload");
    }

    #[tokio::test]
    async fn in_process_bus_ignores_other_topics() {
        let bus = InProcessBus::new();
        let mut rx = bus.subscribe("SCORE_CHANGE", "RANKtest#ephemeral", 8).unwrap();
        bus.publish("OTHER_TOPIC", b"payload".to_vec());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn random_uuid_source_produces_distinct_values() {
        let source = RandomUuidSource;
        assert_ne!(source.new_uuid(), source.new_uuid());
    }
}
