//! Service orchestration for rankboard
//!
//! This crate owns everything that isn't pure data-structure or
//! single-concern logic: the collaborator contracts for systems this
//! service depends on but does not implement ([`collaborators`]),
//! configuration shape ([`config`]), the bus-driven [`event_ingestor`], and
//! [`service`], which wires a [`rankboard_api::FacadeImpl`], a
//! [`rankboard_durability::Checkpointer`], and an
//! [`event_ingestor::EventIngestor`] together into one bootable unit.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collaborators;
pub mod config;
pub mod event_ingestor;
pub mod service;

pub use collaborators::{
    DiscoveryClient, InProcessBus, MessageBusConsumer, NoopDiscoveryClient, RandomUuidSource,
    UuidSource,
};
pub use config::{ServiceConfig, Topology};
pub use event_ingestor::EventIngestor;
pub use service::Service;
