//! Error types for mapping and watching.

use grove_core::{CoreError, NodeId};
use std::path::PathBuf;
use thiserror::Error;

/// Why a filesystem event couldn't become a delta.
#[derive(Error, Debug)]
pub enum MapperError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A frontmatter `node_id` names an id that another file already
    /// owns. The event is rejected and the graph left unchanged.
    #[error("node id '{id}' in '{path}' is already used by '{owner}'")]
    IdCollision {
        id: NodeId,
        path: String,
        owner: String,
    },
}

/// Problems setting up the filesystem watcher.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("vault root '{0}' is not a directory")]
    MissingRoot(PathBuf),

    #[error("watch error: {0}")]
    Notify(#[from] notify::Error),
}
