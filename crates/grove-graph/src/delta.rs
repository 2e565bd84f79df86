//! Graph deltas and the reducer that applies them.
//!
//! A delta is an ordered list of upserts and deletes. Applying one is a
//! pure function of the old graph and the delta, which is what lets two
//! processes stay in sync by exchanging deltas instead of graphs.

use crate::graph::Graph;
use grove_core::{GraphNode, NodeId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A single graph mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeDelta {
    /// Insert the node, or replace the existing node with the same id
    /// wholesale.
    UpsertNode { node: GraphNode },
    /// Remove the node. Edges pointing at it from other nodes stay and
    /// become dangling.
    DeleteNode {
        #[serde(rename = "nodeId")]
        node_id: NodeId,
    },
}

impl NodeDelta {
    /// Id of the node this operation touches.
    pub fn node_id(&self) -> &NodeId {
        match self {
            Self::UpsertNode { node } => &node.id,
            Self::DeleteNode { node_id } => node_id,
        }
    }
}

/// An ordered sequence of mutations describing one state transition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Delta(Vec<NodeDelta>);

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: append an upsert.
    pub fn upsert(mut self, node: GraphNode) -> Self {
        self.0.push(NodeDelta::UpsertNode { node });
        self
    }

    /// Builder pattern: append a delete.
    pub fn delete(mut self, node_id: impl Into<NodeId>) -> Self {
        self.0.push(NodeDelta::DeleteNode {
            node_id: node_id.into(),
        });
        self
    }

    pub fn push(&mut self, op: NodeDelta) {
        self.0.push(op);
    }

    /// Appends all operations of `other`, keeping their order.
    pub fn extend(&mut self, other: Delta) {
        self.0.extend(other.0);
    }

    pub fn ops(&self) -> &[NodeDelta] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A delta deleting every node of `graph`, in map order.
    pub fn clear(graph: &Graph) -> Self {
        Self(
            graph
                .ids()
                .map(|id| NodeDelta::DeleteNode {
                    node_id: id.clone(),
                })
                .collect(),
        )
    }
}

impl From<Vec<NodeDelta>> for Delta {
    fn from(ops: Vec<NodeDelta>) -> Self {
        Self(ops)
    }
}

impl FromIterator<NodeDelta> for Delta {
    fn from_iter<I: IntoIterator<Item = NodeDelta>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Delta {
    type Item = NodeDelta;
    type IntoIter = std::vec::IntoIter<NodeDelta>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Delta {
    type Item = &'a NodeDelta;
    type IntoIter = std::slice::Iter<'a, NodeDelta>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Applies `delta` to `graph`, returning the new graph.
///
/// Operations run strictly in order, each one seeing the effect of the
/// previous ones. The input graph is left untouched. Upserts always
/// succeed; deleting a missing id does nothing.
pub fn apply_graph_delta(graph: &Graph, delta: &Delta) -> Graph {
    let mut next = graph.clone();

    for op in delta {
        match op {
            NodeDelta::UpsertNode { node } => {
                next.insert_node(node.clone());
            }
            NodeDelta::DeleteNode { node_id } => {
                if next.remove_node(node_id.as_str()).is_none() {
                    debug!("Delete of unknown node {} ignored", node_id);
                }
            }
        }
    }

    debug_assert!(next.is_index_consistent());
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_core::Edge;

    fn make_node(id: &str, targets: &[&str]) -> GraphNode {
        GraphNode::new(id).with_edges(targets.iter().map(|t| Edge::to(*t)).collect())
    }

    #[test]
    fn test_upsert_delete_scenario() {
        let delta = Delta::new()
            .upsert(make_node("A", &["B"]))
            .upsert(make_node("B", &[]))
            .delete("A");

        let graph = apply_graph_delta(&Graph::empty(), &delta);

        assert_eq!(graph.node_count(), 1);
        assert!(graph.contains("B"));
        assert!(graph.incoming_ids("B").is_empty());
        assert!(graph.incoming_edges_index().is_empty());
    }

    #[test]
    fn test_apply_is_pure() {
        let before = Graph::from_nodes(vec![make_node("a", &["b"])]);
        let snapshot = before.clone();

        let after = apply_graph_delta(&before, &Delta::new().delete("a"));

        assert_eq!(before, snapshot);
        assert!(after.is_empty());
    }

    #[test]
    fn test_upsert_replaces_wholesale() {
        let mut original = make_node("a", &["b", "c"]);
        original.ui_metadata.color = Some("red".into());
        let graph = Graph::from_nodes(vec![original]);

        let graph = apply_graph_delta(&graph, &Delta::new().upsert(make_node("a", &["d"])));

        let node = graph.get("a").unwrap();
        assert!(node.ui_metadata.color.is_none());
        assert_eq!(node.outgoing_edges, vec![Edge::to("d")]);
        assert!(graph.incoming_ids("b").is_empty());
        assert!(graph.incoming_ids("c").is_empty());
        assert_eq!(graph.incoming_ids("d"), &[NodeId::new("a")]);
    }

    #[test]
    fn test_delete_leaves_dangling_edges() {
        let graph = Graph::from_nodes(vec![make_node("a", &["b"]), make_node("b", &[])]);

        let graph = apply_graph_delta(&graph, &Delta::new().delete("b"));

        assert!(!graph.contains("b"));
        assert_eq!(graph.get("a").unwrap().outgoing_edges, vec![Edge::to("b")]);
        // a still links to b, so the entry stays
        assert_eq!(graph.incoming_ids("b"), &[NodeId::new("a")]);
        assert!(graph.is_index_consistent());
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let graph = Graph::from_nodes(vec![make_node("a", &[])]);
        let after = apply_graph_delta(&graph, &Delta::new().delete("zzz"));
        assert_eq!(graph, after);
    }

    #[test]
    fn test_idempotent() {
        let base = Graph::from_nodes(vec![
            make_node("x", &["a"]),
            make_node("y", &["a", "b"]),
        ]);
        let delta = Delta::new()
            .upsert(make_node("a", &["y"]))
            .upsert(make_node("b", &["a", "ghost"]))
            .delete("x")
            .upsert(make_node("a", &["b"]));

        let once = apply_graph_delta(&base, &delta);
        let twice = apply_graph_delta(&once, &delta);

        assert_eq!(once, twice);
        assert_eq!(once, Graph::from_nodes(once.nodes().values().cloned()));
    }

    #[test]
    fn test_later_ops_observe_earlier_ones() {
        let delta = Delta::new()
            .upsert(make_node("a", &["b"]))
            .delete("a")
            .upsert(make_node("a", &["c"]));

        let graph = apply_graph_delta(&Graph::empty(), &delta);

        assert!(graph.incoming_ids("b").is_empty());
        assert_eq!(graph.incoming_ids("c"), &[NodeId::new("a")]);
    }

    #[test]
    fn test_clear_delta_empties_graph() {
        let graph = Graph::from_nodes(vec![make_node("a", &["b"]), make_node("b", &["ghost"])]);
        let cleared = apply_graph_delta(&graph, &Delta::clear(&graph));
        assert_eq!(cleared, Graph::empty());
    }

    #[test]
    fn test_delta_wire_format() {
        let delta = Delta::new().upsert(make_node("a", &[])).delete("b");
        let json = serde_json::to_value(&delta).unwrap();

        assert_eq!(json[0]["type"], "UpsertNode");
        assert_eq!(json[0]["node"]["id"], "a");
        assert_eq!(json[1]["type"], "DeleteNode");
        assert_eq!(json[1]["nodeId"], "b");

        let back: Delta = serde_json::from_value(json).unwrap();
        assert_eq!(back, delta);
    }
}
