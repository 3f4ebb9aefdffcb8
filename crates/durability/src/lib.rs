//! Checkpointing for rankboard
//!
//! [`EmbeddedKvStore`] is the collaborator contract a real embedded store
//! plugs into; [`FileKvStore`] is a complete crash-safe implementation of
//! it. [`Checkpointer`] batches dirty leaderboards and flushes them on a
//! timer, and restores the registry from the last checkpoint on boot.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checkpointer;
pub mod kv_store;

pub use checkpointer::{Checkpointer, DirtyMarker};
pub use kv_store::{CheckpointMap, EmbeddedKvStore, FileKvStore};
