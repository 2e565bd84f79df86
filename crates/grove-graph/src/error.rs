//! Error types for graph queries.

use grove_core::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A caller expected this node to exist. Usually means a mirrored
    /// copy of the graph is out of sync with the authoritative one.
    #[error("node not found: '{0}'")]
    NodeNotFound(NodeId),
}
