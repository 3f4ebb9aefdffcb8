//! Concurrent access layer for rankboard
//!
//! [`Registry`] multiplexes any number of independent, named leaderboards,
//! each behind its own lock, so operations on different leaderboards never
//! contend with each other.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod registry;

pub use registry::{BoardHandle, Registry};
