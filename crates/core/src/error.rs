//! Unified error type for rankboard.
//!
//! Programmer errors (a precondition a caller should never be able to
//! violate) are not represented here at all — they're a `panic!`/
//! `debug_assert!` inside `rankboard-primitives::OrderIndex` instead of a
//! `RankError` variant, since there's no sane recovery for a caller to do.
//!
//! `RankError::InvalidInput` covers input validation that doesn't fit any
//! of the other kinds (e.g. an empty leaderboard name) but still needs a
//! `Result` path rather than a panic.

use thiserror::Error;

/// Result type alias for rankboard operations.
pub type RankResult<T> = std::result::Result<T, RankError>;

/// Unified error type for rankboard.
#[derive(Debug, Error)]
pub enum RankError {
    /// A query named a leaderboard that has never been updated.
    ///
    /// Surfaced to RPC clients; this is *not* logged as an error — it's an
    /// expected outcome of querying a board nobody has written to.
    #[error("leaderboard does not exist: {name}")]
    NameNotExists {
        /// The leaderboard name that was looked up.
        name: String,
    },

    /// A bus message or KV blob failed to decode.
    ///
    /// On the bus path this is logged and the message is acknowledged (not
    /// retried). On the KV restore path this is fatal — see
    /// [`RankError::is_fatal`].
    #[error("decode error: {message}")]
    Decode {
        /// What failed to decode and why.
        message: String,
    },

    /// RPC, bus, or discovery collaborator failure.
    ///
    /// Retried by the collaborator library where applicable; surfaced as an
    /// internal RPC error if unrecoverable.
    #[error("transport error: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },

    /// The embedded KV store failed to write a checkpoint.
    ///
    /// Fatal: the process should exit so an orchestrator can restart it.
    #[error("checkpoint write failed: {message}")]
    Checkpoint {
        /// Description of the failure.
        message: String,
    },

    /// Input failed validation (e.g. an empty leaderboard name).
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of what was invalid.
        message: String,
    },
}

impl RankError {
    /// `NameNotExists` only — the one kind that must not be logged as an
    /// error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RankError::NameNotExists { .. })
    }

    /// Whether this is a decode failure. Decode errors on the bus-ingestion
    /// path should be logged and acked rather than treated as fatal; the
    /// same kind encountered while restoring the KV store is fatal instead
    /// — see [`RankError::is_fatal`].
    pub fn is_decode(&self) -> bool {
        matches!(self, RankError::Decode { .. })
    }

    /// Checkpoint failures are always fatal: the process should exit so an
    /// orchestrator can restart it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RankError::Checkpoint { .. })
    }

    /// Transport failures are the one kind that may be safely retried by a
    /// caller without risking duplicate side effects on the RankSet itself
    /// — score updates are idempotent.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RankError::Transport { .. })
    }
}
