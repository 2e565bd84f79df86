//! The note graph and its derived incoming-edge index.
//!
//! Nodes live in a `BTreeMap`, so iteration order is the lexicographic
//! id order. That order is what "map order" means everywhere else in
//! this crate, and it is identical in every process holding a copy.
//!
//! The incoming index is never edited by hand. It is built here by the
//! two constructors and maintained by the delta applier, and it always
//! equals what `build_incoming_edges_index` would produce from scratch.

use grove_core::{GraphNode, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Target id -> ids of the nodes whose edges point at it.
///
/// One entry per edge, so a source with two links to the same target is
/// listed twice. Entries are sorted by source id. Targets with no
/// incoming edges have no entry at all.
pub type IncomingEdgesIndex = BTreeMap<NodeId, Vec<NodeId>>;

/// Builds the reverse adjacency of `nodes`.
///
/// Entries are created for dangling targets too.
pub fn build_incoming_edges_index(nodes: &BTreeMap<NodeId, GraphNode>) -> IncomingEdgesIndex {
    let mut index = IncomingEdgesIndex::new();
    for node in nodes.values() {
        for edge in &node.outgoing_edges {
            index
                .entry(edge.target_id.clone())
                .or_default()
                .push(node.id.clone());
        }
    }
    index
}

/// The note graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "GraphNodes")]
pub struct Graph {
    nodes: BTreeMap<NodeId, GraphNode>,
    incoming_edges_index: IncomingEdgesIndex,
}

/// Wire form accepted on deserialization. Nodes are rekeyed by their own
/// id and the index is always rebuilt.
#[derive(Deserialize)]
struct GraphNodes {
    #[serde(default)]
    nodes: BTreeMap<NodeId, GraphNode>,
}

impl From<GraphNodes> for Graph {
    fn from(wire: GraphNodes) -> Self {
        Graph::from_nodes(wire.nodes.into_values())
    }
}

impl Graph {
    /// Creates an empty graph.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a graph from nodes. A later node with a repeated id
    /// replaces the earlier one.
    pub fn from_nodes(nodes: impl IntoIterator<Item = GraphNode>) -> Self {
        let map = nodes
            .into_iter()
            .map(|node| (node.id.clone(), node))
            .collect();
        Self::from_map(map)
    }

    fn from_map(nodes: BTreeMap<NodeId, GraphNode>) -> Self {
        let incoming_edges_index = build_incoming_edges_index(&nodes);
        Self {
            nodes,
            incoming_edges_index,
        }
    }

    /// All nodes, in map order.
    pub fn nodes(&self) -> &BTreeMap<NodeId, GraphNode> {
        &self.nodes
    }

    pub fn incoming_edges_index(&self) -> &IncomingEdgesIndex {
        &self.incoming_edges_index
    }

    /// Gets a node by id.
    pub fn get(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Ids of the nodes linking to `id`, one per edge. Empty if none.
    pub fn incoming_ids(&self, id: &str) -> &[NodeId] {
        self.incoming_edges_index
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges, dangling ones included.
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.outgoing_edges.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Consumes the graph, returning its nodes in map order.
    pub fn into_nodes(self) -> impl Iterator<Item = GraphNode> {
        self.nodes.into_values()
    }

    /// Whether the index matches the edges exactly.
    pub fn is_index_consistent(&self) -> bool {
        build_incoming_edges_index(&self.nodes) == self.incoming_edges_index
    }

    // Index maintenance, used by the delta applier only.

    pub(crate) fn insert_node(&mut self, node: GraphNode) {
        if let Some(previous) = self.nodes.remove(&node.id) {
            self.unindex(&previous);
        }
        self.index(&node);
        self.nodes.insert(node.id.clone(), node);
    }

    pub(crate) fn remove_node(&mut self, id: &str) -> Option<GraphNode> {
        let previous = self.nodes.remove(id)?;
        self.unindex(&previous);
        Some(previous)
    }

    fn index(&mut self, node: &GraphNode) {
        for edge in &node.outgoing_edges {
            let sources = self
                .incoming_edges_index
                .entry(edge.target_id.clone())
                .or_default();
            // Keep the same order a fresh build would produce
            let at = sources.partition_point(|s| s <= &node.id);
            sources.insert(at, node.id.clone());
        }
    }

    fn unindex(&mut self, node: &GraphNode) {
        for edge in &node.outgoing_edges {
            if let Some(sources) = self.incoming_edges_index.get_mut(&edge.target_id) {
                sources.retain(|s| s != &node.id);
                if sources.is_empty() {
                    self.incoming_edges_index.remove(&edge.target_id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_core::Edge;

    fn make_node(id: &str, targets: &[&str]) -> GraphNode {
        GraphNode::new(id).with_edges(targets.iter().map(|t| Edge::to(*t)).collect())
    }

    #[test]
    fn test_empty_graph() {
        let graph = Graph::empty();
        assert!(graph.is_empty());
        assert!(graph.incoming_edges_index().is_empty());
        assert!(graph.incoming_ids("anything").is_empty());
    }

    #[test]
    fn test_index_includes_dangling_targets() {
        let graph = Graph::from_nodes(vec![make_node("a", &["b", "ghost"]), make_node("b", &[])]);

        assert_eq!(graph.incoming_ids("b"), &[NodeId::new("a")]);
        assert_eq!(graph.incoming_ids("ghost"), &[NodeId::new("a")]);
        assert!(graph.incoming_ids("a").is_empty());
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_index_sorted_by_source() {
        let graph = Graph::from_nodes(vec![
            make_node("c", &["t"]),
            make_node("a", &["t"]),
            make_node("b", &["t"]),
        ]);
        let ids: Vec<&str> = graph.incoming_ids("t").iter().map(|s| s.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_incremental_index_matches_fresh_build() {
        let mut graph = Graph::from_nodes(vec![
            make_node("a", &["t"]),
            make_node("c", &["t"]),
        ]);
        graph.insert_node(make_node("b", &["t", "t2"]));
        graph.insert_node(make_node("a", &["t2"]));
        graph.remove_node("c");

        assert!(graph.is_index_consistent());
        let ids: Vec<&str> = graph.incoming_ids("t2").iter().map(|s| s.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_deserialize_rebuilds_index() {
        let json = r#"{
            "nodes": {
                "a": {"id": "a", "outgoingEdges": [{"targetId": "b", "label": ""}], "content": "", "uiMetadata": {}}
            },
            "incomingEdgesIndex": {"bogus": ["x"]}
        }"#;
        let graph: Graph = serde_json::from_str(json).unwrap();

        assert!(graph.is_index_consistent());
        assert_eq!(graph.incoming_ids("b"), &[NodeId::new("a")]);
        assert!(graph.incoming_ids("bogus").is_empty());
    }

    #[test]
    fn test_deserialize_rekeys_by_node_id() {
        let json = r#"{
            "nodes": {
                "x": {"id": "y", "outgoingEdges": [], "content": "", "uiMetadata": {}}
            }
        }"#;
        let graph: Graph = serde_json::from_str(json).unwrap();
        assert!(!graph.contains("x"));
        assert!(graph.contains("y"));

        let graph = crate::delta::apply_graph_delta(
            &graph,
            &crate::Delta::new().upsert(GraphNode::new("y").with_content("new")),
        );
        let ids: Vec<&str> = graph.nodes().values().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["y"]);
    }
}
