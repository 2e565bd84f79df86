//! The single authoritative graph.
//!
//! `GraphStore` owns the current graph and is the only place it changes.
//! Every change goes through `apply_graph_delta`; readers get cheap
//! `Arc` snapshots that stay valid while the store moves on.

use crate::delta::{apply_graph_delta, Delta};
use crate::graph::Graph;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default)]
pub struct GraphStore {
    current: RwLock<Arc<Graph>>,
}

impl GraphStore {
    /// Creates a store holding the empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current graph.
    pub fn get(&self) -> Arc<Graph> {
        Arc::clone(&self.current.read())
    }

    /// Applies a delta to the current graph and publishes the result.
    ///
    /// Returns the new snapshot.
    pub fn apply(&self, delta: &Delta) -> Arc<Graph> {
        let mut current = self.current.write();
        let next = Arc::new(apply_graph_delta(&current, delta));
        debug!(
            "Applied delta of {} ops ({} -> {} nodes)",
            delta.len(),
            current.node_count(),
            next.node_count()
        );
        *current = Arc::clone(&next);
        next
    }

    /// Empties the graph, e.g. when the vault root changes.
    ///
    /// Returns the delta that did it, so mirrors can be cleared the
    /// same way.
    pub fn reset(&self) -> Delta {
        let mut current = self.current.write();
        let delta = Delta::clear(&current);
        *current = Arc::new(apply_graph_delta(&current, &delta));
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_core::{Edge, GraphNode};

    #[test]
    fn test_apply_publishes_new_snapshot() {
        let store = GraphStore::new();
        let before = store.get();

        let after = store.apply(
            &Delta::new().upsert(GraphNode::new("a").with_edges(vec![Edge::to("b")])),
        );

        assert!(before.is_empty());
        assert_eq!(after.node_count(), 1);
        assert_eq!(store.get(), after);
    }

    #[test]
    fn test_reset_returns_clearing_delta() {
        let store = GraphStore::new();
        store.apply(&Delta::new().upsert(GraphNode::new("a")).upsert(GraphNode::new("b")));

        let delta = store.reset();

        assert_eq!(delta.len(), 2);
        assert!(store.get().is_empty());
        assert!(store.reset().is_empty());
    }

    #[test]
    fn test_snapshot_unaffected_by_later_apply() {
        let store = GraphStore::new();
        store.apply(&Delta::new().upsert(GraphNode::new("a")));
        let snapshot = store.get();

        store.apply(&Delta::new().delete("a"));

        assert!(snapshot.contains("a"));
        assert!(!store.get().contains("a"));
    }
}
