//! Error types for replication.

use grove_graph::GraphError;
use grove_watcher::MapperError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The mirror missed at least one delta and has drifted from the
    /// authoritative graph. It needs a fresh snapshot.
    #[error("sequence gap: expected delta {expected}, got {got}")]
    SequenceGap { expected: u64, got: u64 },

    #[error("event rejected: {0}")]
    Rejected(#[from] MapperError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
