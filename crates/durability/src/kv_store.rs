//! The embedded key-value store collaborator contract, and a crash-safe
//! single-file implementation of it.
//!
//! The real deployment's embedded KV store (bbolt, sled, or similar) is out
//! of scope — [`EmbeddedKvStore`] is the seam a real one would plug into.
//! [`FileKvStore`] is a complete, self-contained implementation usable for
//! tests and small deployments: the whole `RANKING` bucket lives in one
//! file, written with the same write-temp → fsync → rename → fsync-dir →
//! CRC32-footer sequence the checkpoint format in the durability layer
//! uses, so a crash mid-write never leaves a corrupt file visible at the
//! real path.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use rankboard_core::error::{RankError, RankResult};
use rankboard_primitives::RankSetSnapshot;
use rustc_hash::FxHashMap;

/// A checkpoint: every leaderboard's snapshot, keyed by leaderboard name.
pub type CheckpointMap = FxHashMap<String, RankSetSnapshot>;

/// The embedded key-value store collaborator contract.
///
/// Wiring a real embedded store is out of scope; this trait is the
/// boundary the checkpointer is written against.
pub trait EmbeddedKvStore: Send + Sync {
    /// Load the full `RANKING` bucket. Returns an empty map if nothing has
    /// ever been written.
    fn load(&self) -> RankResult<CheckpointMap>;

    /// Overwrite the full `RANKING` bucket.
    fn save(&self, checkpoint: &CheckpointMap) -> RankResult<()>;
}

/// A single-file, crash-safe [`EmbeddedKvStore`].
pub struct FileKvStore {
    path: PathBuf,
}

impl FileKvStore {
    /// Point a store at `path`. The file (and its parent directory) are
    /// created lazily on first [`save`](Self::save).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "checkpoint".to_string());
        self.path
            .with_file_name(format!(".{file_name}.tmp"))
    }
}

impl EmbeddedKvStore for FileKvStore {
    fn load(&self) -> RankResult<CheckpointMap> {
        if !self.path.exists() {
            return Ok(CheckpointMap::default());
        }

        let data = std::fs::read(&self.path).map_err(|e| RankError::Checkpoint {
            message: format!("reading {}: {e}", self.path.display()),
        })?;

        if data.len() < 4 {
            return Err(RankError::Decode {
                message: "checkpoint file shorter than its CRC32 footer".to_string(),
            });
        }

        let (body, footer) = data.split_at(data.len() - 4);
        let stored_crc = u32::from_le_bytes(footer.try_into().expect("footer is 4 bytes"));

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(body);
        if hasher.finalize() != stored_crc {
            return Err(RankError::Decode {
                message: "checkpoint CRC32 mismatch, file is corrupt".to_string(),
            });
        }

        rmp_serde::from_slice(body).map_err(|e| RankError::Decode {
            message: format!("decoding checkpoint: {e}"),
        })
    }

    fn save(&self, checkpoint: &CheckpointMap) -> RankResult<()> {
        let body = rmp_serde::to_vec(checkpoint).map_err(|e| RankError::Checkpoint {
            message: format!("encoding checkpoint: {e}"),
        })?;

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&body);
        let crc = hasher.finalize();

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir).map_err(|e| RankError::Checkpoint {
            message: format!("creating {}: {e}", dir.display()),
        })?;

        let temp_path = self.temp_path();
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| RankError::Checkpoint {
                message: format!("opening {}: {e}", temp_path.display()),
            })?;

        file.write_all(&body)
            .and_then(|_| file.write_all(&crc.to_le_bytes()))
            .and_then(|_| file.sync_all())
            .map_err(|e| RankError::Checkpoint {
                message: format!("writing {}: {e}", temp_path.display()),
            })?;
        drop(file);

        std::fs::rename(&temp_path, &self.path).map_err(|e| RankError::Checkpoint {
            message: format!("renaming {} to {}: {e}", temp_path.display(), self.path.display()),
        })?;

        let dir_handle = File::open(dir).map_err(|e| RankError::Checkpoint {
            message: format!("reopening {} for fsync: {e}", dir.display()),
        })?;
        dir_handle.sync_all().map_err(|e| RankError::Checkpoint {
            message: format!("fsyncing {}: {e}", dir.display()),
        })?;

        Ok(())
    }
}
