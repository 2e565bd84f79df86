//! Read-only queries over the graph.
//!
//! Dangling edges are tolerated everywhere: ids that don't resolve to a
//! node are dropped from results, never reported as errors.

use crate::error::{GraphError, Result};
use crate::graph::Graph;
use grove_core::{resolve_title, GraphNode, NodeId};
use serde::{Deserialize, Serialize};

/// Point lookup. `None` if the id isn't in the graph.
pub fn get_node<'g>(graph: &'g Graph, id: &str) -> Option<&'g GraphNode> {
    graph.get(id)
}

/// Lookup for callers that know the node must exist, such as a UI
/// request for a node it is already showing. A miss means the two
/// copies of the graph have drifted apart.
pub fn require_node<'g>(graph: &'g Graph, id: &str) -> Result<&'g GraphNode> {
    graph
        .get(id)
        .ok_or_else(|| GraphError::NodeNotFound(NodeId::new(id)))
}

/// First node, in map order, that links to `id`. `None` for roots.
///
/// A self-link doesn't make a node its own parent.
pub fn parent_of<'g>(id: &str, graph: &'g Graph) -> Option<&'g GraphNode> {
    graph
        .nodes()
        .values()
        .find(|node| node.id.as_str() != id && node.links_to(id))
}

/// Nodes that link to `id`, in index order, each listed once.
pub fn incoming_nodes_of<'g>(id: &str, graph: &'g Graph) -> Vec<&'g GraphNode> {
    let mut seen: Vec<&NodeId> = Vec::new();
    let mut nodes = Vec::new();

    for source in graph.incoming_ids(id) {
        if seen.contains(&source) {
            continue;
        }
        seen.push(source);
        if let Some(node) = graph.get(source.as_str()) {
            nodes.push(node);
        }
    }

    nodes
}

/// Outgoing plus incoming edge count of a node.
pub fn connection_count(id: &str, graph: &Graph) -> usize {
    let outgoing = graph.get(id).map_or(0, |n| n.outgoing_edges.len());
    outgoing + graph.incoming_ids(id).len()
}

/// The candidate with the most connections. Ties go to whichever comes
/// first in `candidates`. `None` only when `candidates` is empty.
pub fn most_connected<'c>(candidates: &'c [NodeId], graph: &Graph) -> Option<&'c NodeId> {
    let mut best: Option<(&NodeId, usize)> = None;

    for id in candidates {
        let count = connection_count(id.as_str(), graph);
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((id, count)),
        }
    }

    best.map(|(id, _)| id)
}

/// Summary of a node for listings and protocol responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub id: NodeId,
    pub title: String,
    pub color: Option<String>,
    pub outgoing: usize,
    pub incoming: usize,
    pub is_context_node: bool,
}

impl NodeInfo {
    pub fn new(node: &GraphNode, graph: &Graph) -> Self {
        Self {
            id: node.id.clone(),
            title: resolve_title(node),
            color: node.ui_metadata.color.clone(),
            outgoing: node.outgoing_edges.len(),
            incoming: graph.incoming_ids(node.id.as_str()).len(),
            is_context_node: node.ui_metadata.is_context_node,
        }
    }
}
