//! Service: boots a registry from its checkpoint, then runs the
//! checkpointer and event ingestor side by side until asked to shut down.

use std::sync::Arc;

use rankboard_api::FacadeImpl;
use rankboard_concurrency::Registry;
use rankboard_core::limits::SCORE_CHANGE_TOPIC;
use rankboard_core::RankResult;
use rankboard_durability::{Checkpointer, EmbeddedKvStore};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::collaborators::{MessageBusConsumer, UuidSource};
use crate::config::ServiceConfig;
use crate::event_ingestor::EventIngestor;

/// A booted rankboard instance: the facade RPC handlers are built against,
/// plus handles for its background tasks and a way to shut them down.
pub struct Service {
    /// The facade an RPC transport dispatches requests to.
    pub facade: Arc<FacadeImpl>,
    shutdown_tx: watch::Sender<bool>,
    checkpointer_handle: JoinHandle<()>,
    ingestor_handle: JoinHandle<RankResult<()>>,
}

impl Service {
    /// Boot a service: restore the registry from `store`'s checkpoint, then
    /// spawn the checkpointer and event ingestor tasks.
    ///
    /// `config.topology` governs whether the returned facade's writes apply
    /// to the registry directly or only publish to `bus`; either way, the
    /// event ingestor is always run, since both topologies rely on it (see
    /// `Topology::ingests_from_bus`).
    pub async fn boot<S, B>(
        config: ServiceConfig,
        store: Arc<S>,
        bus: Arc<B>,
        uuid_source: Arc<dyn UuidSource>,
    ) -> RankResult<Self>
    where
        S: EmbeddedKvStore + 'static,
        B: MessageBusConsumer + 'static,
    {
        let registry = Arc::new(Registry::with_upper_threshold(config.upper_threshold));
        let (checkpointer, dirty_marker, dirty_rx) = Checkpointer::new(
            store,
            registry.clone(),
            config.changes_size,
            config.check_interval,
            config.upper_threshold,
        );

        let restored = checkpointer.restore()?;
        tracing::debug!(leaderboards = restored, "restored leaderboards from checkpoint");

        let facade = Arc::new(FacadeImpl::new(registry.clone(), dirty_marker.clone()));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let checkpointer_handle = {
            let shutdown_rx = shutdown_rx.clone();
            tokio::spawn(async move {
                checkpointer.run(dirty_rx, shutdown_rx).await;
            })
        };

        let ingestor_handle = {
            let ingestor = EventIngestor::new(bus, registry, dirty_marker);
            let shutdown_rx = shutdown_rx.clone();
            let in_flight = config.nsq_in_flight;
            tokio::spawn(async move {
                ingestor
                    .run(SCORE_CHANGE_TOPIC, in_flight, uuid_source.as_ref(), shutdown_rx)
                    .await
            })
        };

        Ok(Self {
            facade,
            shutdown_tx,
            checkpointer_handle,
            ingestor_handle,
        })
    }

    /// Signal the checkpointer and event ingestor to stop, and wait for
    /// both to finish (the checkpointer performs one final flush).
    pub async fn shutdown(self) -> RankResult<()> {
        let _ = self.shutdown_tx.send(true);
        self.checkpointer_handle
            .await
            .expect("checkpointer task panicked");
        self.ingestor_handle.await.expect("event ingestor task panicked")
    }
}
