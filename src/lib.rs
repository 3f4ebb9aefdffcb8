//! # rankboard
//!
//! A named leaderboard service: any number of independent rank sets, each
//! keyed by name, each mapping user IDs to integer scores, with O(log n)
//! rank-range and per-user rank queries backed by an order-statistic tree.
//!
//! ```no_run
//! use rankboard::{RankChange, RankboardFacade};
//! # async fn run() -> rankboard::RankResult<()> {
//! use std::sync::Arc;
//! use rankboard::{ServiceConfig, Service, InProcessBus, RandomUuidSource, UuidSource};
//! use rankboard_durability::FileKvStore;
//!
//! let config = ServiceConfig::default();
//! let store = Arc::new(FileKvStore::new(config.kv_store_path.clone()));
//! let bus = Arc::new(InProcessBus::new());
//! let uuid_source: Arc<dyn UuidSource> = Arc::new(RandomUuidSource);
//!
//! let service = Service::boot(config, store, bus, uuid_source).await?;
//! service.facade.rank_change(RankChange { name: "season-3".into(), user_id: 1, score: 100 })?;
//! service.shutdown().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Crates
//!
//! | Crate | Responsibility |
//! |---|---|
//! | `rankboard-core` | shared types, constants, the unified error type |
//! | `rankboard-primitives` | OrderIndex, SmallSet, RankSet |
//! | `rankboard-concurrency` | Registry |
//! | `rankboard-durability` | embedded KV store contract, Checkpointer |
//! | `rankboard-engine` | collaborator contracts, EventIngestor, Service |
//! | `rankboard-api` | RPC-facing facade, request/response types |
//!
//! Only this crate's re-exported surface is stable; depending on the
//! sub-crates directly is supported but their internals move more freely.

pub use rankboard_api::{FacadeImpl, QueryRankRange, QueryUsers, RankChange, RankEntry, RankboardFacade};
pub use rankboard_core::entry::{Score, ScoreEntry, UserId};
pub use rankboard_core::error::{RankError, RankResult};
pub use rankboard_core::name::LeaderboardName;
pub use rankboard_engine::{
    DiscoveryClient, InProcessBus, MessageBusConsumer, NoopDiscoveryClient, RandomUuidSource,
    Service, ServiceConfig, Topology, UuidSource,
};
