//! Checkpointer: periodic, batched flush of dirty leaderboards to the
//! embedded key-value store, and restore-on-boot.
//!
//! Every write to a leaderboard marks its name dirty on a bounded channel
//! rather than flushing synchronously — flushing on every write would make
//! every RPC call pay for a full-file rewrite. The channel capacity is
//! `CHANGES_SIZE`; once full, new dirty marks are dropped rather than
//! blocking the writer, mirroring the background scheduler's backpressure
//! policy elsewhere in this stack: a dropped mark just means the next
//! periodic tick's flush catches it on its next write instead, since the
//! leaderboard itself (not the mark) is the source of truth.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use rankboard_concurrency::Registry;
use rankboard_core::name::LeaderboardName;
use rankboard_core::RankResult;
use rankboard_primitives::RankSet;
use tokio::sync::{mpsc, watch};

use crate::kv_store::{CheckpointMap, EmbeddedKvStore};

/// Handle used by callers (the RPC facade, the event ingestor) to mark a
/// leaderboard dirty after a successful update.
#[derive(Clone)]
pub struct DirtyMarker {
    tx: mpsc::Sender<LeaderboardName>,
}

impl DirtyMarker {
    /// Mark `name` dirty. Never blocks: if the channel is full the mark is
    /// dropped and logged at debug level.
    pub fn mark(&self, name: LeaderboardName) {
        if self.tx.try_send(name.clone()).is_err() {
            tracing::debug!(
                leaderboard = %name,
                "dirty-name channel full, dropping mark for this tick"
            );
        }
    }
}

/// Periodically flushes dirty leaderboards to an [`EmbeddedKvStore`].
pub struct Checkpointer<S: EmbeddedKvStore> {
    store: Arc<S>,
    registry: Arc<Registry>,
    check_interval: Duration,
    upper_threshold: usize,
}

impl<S: EmbeddedKvStore + 'static> Checkpointer<S> {
    /// Build a checkpointer and the [`DirtyMarker`]/receiver pair that feed
    /// it. Callers pass the `DirtyMarker` to whatever marks leaderboards
    /// dirty, and the receiver into [`Checkpointer::run`].
    ///
    /// `check_interval` governs how often [`Checkpointer::run`] flushes the
    /// dirty set; `upper_threshold` is applied to every leaderboard rebuilt
    /// by [`Checkpointer::restore`], so a configured promotion threshold
    /// survives a restart.
    pub fn new(
        store: Arc<S>,
        registry: Arc<Registry>,
        changes_size: usize,
        check_interval: Duration,
        upper_threshold: usize,
    ) -> (Self, DirtyMarker, mpsc::Receiver<LeaderboardName>) {
        let (tx, rx) = mpsc::channel(changes_size);
        (
            Self { store, registry, check_interval, upper_threshold },
            DirtyMarker { tx },
            rx,
        )
    }

    /// Load the checkpoint and install every leaderboard it contains into
    /// the registry. Called once at boot, before serving any traffic.
    pub fn restore(&self) -> RankResult<usize> {
        let checkpoint = self.store.load()?;
        let count = checkpoint.len();
        for (name, snapshot) in checkpoint {
            let name = LeaderboardName::new(name)?;
            tracing::debug!(leaderboard = %name, users = snapshot.scores.len(), "restoring leaderboard from checkpoint");
            self.registry
                .restore(name, RankSet::unmarshal_with_threshold(snapshot, self.upper_threshold));
        }
        Ok(count)
    }

    fn flush(&self, dirty: &mut HashSet<LeaderboardName>) {
        if dirty.is_empty() {
            return;
        }

        let mut checkpoint: CheckpointMap = match self.store.load() {
            Ok(existing) => existing,
            Err(e) => {
                tracing::error!(error = %e, "failed to load existing checkpoint before flush, starting from empty");
                CheckpointMap::default()
            }
        };

        let flushed = dirty.len();
        for name in dirty.drain() {
            if let Some(board) = self.registry.get(&name) {
                checkpoint.insert(name.to_string(), board.read().marshal());
            }
        }

        match self.store.save(&checkpoint) {
            Ok(()) => tracing::debug!(leaderboards = flushed, "checkpoint flush complete"),
            Err(e) => tracing::error!(error = %e, "checkpoint flush failed"),
        }
    }

    /// Run the flush loop until `shutdown` is signaled. On shutdown,
    /// performs one final flush of whatever is still dirty before
    /// returning.
    pub async fn run(
        &self,
        mut dirty_rx: mpsc::Receiver<LeaderboardName>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut dirty = HashSet::new();
        let mut ticker = tokio::time::interval(self.check_interval);
        ticker.tick().await; // first tick fires immediately; skip it

        loop {
            tokio::select! {
                marked = dirty_rx.recv() => {
                    match marked {
                        Some(name) => {
                            dirty.insert(name);
                        }
                        None => {
                            self.flush(&mut dirty);
                            break;
                        }
                    }
                }
                _ = ticker.tick() => {
                    self.flush(&mut dirty);
                }
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        self.flush(&mut dirty);
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv_store::FileKvStore;
    use rankboard_core::limits::UPPER_THRESHOLD;

    #[tokio::test]
    async fn restore_populates_registry_from_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileKvStore::new(dir.path().join("RANK-DUMP.DAT")));

        let mut checkpoint = CheckpointMap::default();
        let mut rs = RankSet::new();
        rs.update(1, 10);
        rs.update(2, 30);
        checkpoint.insert("season-3".to_string(), rs.marshal());
        store.save(&checkpoint).unwrap();

        let registry = Arc::new(Registry::new());
        let (checkpointer, _marker, _rx) =
            Checkpointer::new(store, registry.clone(), 16, Duration::from_secs(10), UPPER_THRESHOLD);
        let restored = checkpointer.restore().unwrap();

        assert_eq!(restored, 1);
        let name = LeaderboardName::new("season-3").unwrap();
        let board = registry.get(&name).unwrap();
        assert_eq!(board.read().score_of(2), Some(30));
    }

    #[tokio::test]
    async fn restore_applies_configured_upper_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileKvStore::new(dir.path().join("RANK-DUMP.DAT")));

        let mut checkpoint = CheckpointMap::default();
        let mut rs = RankSet::new();
        for user_id in 0..3 {
            rs.update(user_id, user_id);
        }
        checkpoint.insert("season-3".to_string(), rs.marshal());
        store.save(&checkpoint).unwrap();

        let registry = Arc::new(Registry::new());
        let (checkpointer, _marker, _rx) =
            Checkpointer::new(store, registry.clone(), 16, Duration::from_secs(10), 2);
        checkpointer.restore().unwrap();

        let name = LeaderboardName::new("season-3").unwrap();
        let board = registry.get(&name).unwrap();
        assert_eq!(board.read().rank_of(2), Some((1, 2)));
    }

    #[tokio::test]
    async fn shutdown_triggers_final_flush() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileKvStore::new(dir.path().join("RANK-DUMP.DAT")));
        let registry = Arc::new(Registry::new());

        let name = LeaderboardName::new("season-3").unwrap();
        registry.get_or_create(&name).write().update(7, 70);

        let (checkpointer, marker, rx) =
            Checkpointer::new(store.clone(), registry, 16, Duration::from_secs(10), UPPER_THRESHOLD);
        marker.mark(name.clone());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let run_handle = tokio::spawn(async move {
            checkpointer.run(rx, shutdown_rx).await;
        });

        shutdown_tx.send(true).unwrap();
        run_handle.await.unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded["season-3"].scores.get(&7), Some(&70));
    }

    #[tokio::test]
    async fn run_flushes_on_configured_interval() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileKvStore::new(dir.path().join("RANK-DUMP.DAT")));
        let registry = Arc::new(Registry::new());

        let name = LeaderboardName::new("season-3").unwrap();
        registry.get_or_create(&name).write().update(1, 11);

        let (checkpointer, marker, rx) = Checkpointer::new(
            store.clone(),
            registry,
            16,
            Duration::from_millis(20),
            UPPER_THRESHOLD,
        );
        marker.mark(name.clone());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let run_handle = tokio::spawn(async move {
            checkpointer.run(rx, shutdown_rx).await;
        });

        tokio::time::sleep(Duration::from_millis(60)).await;
        let loaded = store.load().unwrap();
        assert_eq!(loaded["season-3"].scores.get(&1), Some(&11));

        shutdown_tx.send(true).unwrap();
        run_handle.await.unwrap();
    }
}
