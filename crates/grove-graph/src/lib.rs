//! Grove Graph - the note graph and everything that reads or changes it
//!
//! The graph is a map of notes plus an index of who links to whom. It
//! only ever changes by applying a [`Delta`], a pure function from one
//! graph to the next, so any two copies fed the same deltas in the same
//! order end up identical.
//!
//! # Example
//!
//! ```
//! use grove_core::{Edge, GraphNode};
//! use grove_graph::{apply_graph_delta, ordered_ids, Delta, Graph};
//!
//! let delta = Delta::new()
//!     .upsert(GraphNode::new("a").with_edges(vec![Edge::to("b")]))
//!     .upsert(GraphNode::new("b"));
//! let graph = apply_graph_delta(&Graph::empty(), &delta);
//!
//! assert_eq!(graph.incoming_ids("b").len(), 1);
//! assert_eq!(ordered_ids(&graph).len(), 2);
//! ```

pub mod context;
pub mod delta;
pub mod error;
pub mod graph;
pub mod query;
pub mod store;
pub mod subgraph;
pub mod traversal;

pub use context::{capture_context, context_node_id, refresh_context, CONTEXT_DIR};
pub use delta::{apply_graph_delta, Delta, NodeDelta};
pub use error::{GraphError, Result};
pub use graph::{build_incoming_edges_index, Graph, IncomingEdgesIndex};
pub use query::{
    connection_count, get_node, incoming_nodes_of, most_connected, parent_of, require_node,
    NodeInfo,
};
pub use store::GraphStore;
pub use subgraph::{by_distance, ids_within_distance, newly_reachable};
pub use traversal::{ordered_ids, ordered_ids_from_roots};
