//! Distance-bounded subgraph extraction.
//!
//! Walks outward from a start node over links in both directions and
//! returns the induced subgraph of everything within `max_distance`
//! hops. This is what a context node captures.

use crate::graph::Graph;
use grove_core::{GraphNode, NodeId};
use std::collections::{HashSet, VecDeque};

/// Ids within `max_distance` hops of `start`, in breadth-first order.
///
/// Edges are followed both ways. Dangling targets are never visited.
/// Empty if `start` isn't in the graph.
pub fn ids_within_distance(graph: &Graph, start: &str, max_distance: usize) -> Vec<NodeId> {
    let start = match graph.get(start) {
        Some(node) => node.id.clone(),
        None => return Vec::new(),
    };

    let mut order = vec![start.clone()];
    let mut visited: HashSet<NodeId> = HashSet::from([start.clone()]);
    let mut queue: VecDeque<(NodeId, usize)> = VecDeque::from([(start, 0)]);

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= max_distance {
            continue;
        }
        let node = match graph.get(current.as_str()) {
            Some(node) => node,
            None => continue,
        };

        let downstream = node.outgoing_edges.iter().map(|e| &e.target_id);
        let upstream = graph.incoming_ids(current.as_str()).iter();

        for neighbor in downstream.chain(upstream) {
            if !graph.contains(neighbor.as_str()) || visited.contains(neighbor) {
                continue;
            }
            visited.insert(neighbor.clone());
            order.push(neighbor.clone());
            queue.push_back((neighbor.clone(), depth + 1));
        }
    }

    order
}

/// The induced subgraph within `max_distance` hops of `start`.
///
/// Only edges with both ends inside the result are kept, and the
/// result's index is built fresh. Distance 0 gives the start node alone
/// with no edges.
pub fn by_distance(graph: &Graph, start: &str, max_distance: usize) -> Graph {
    let ids = ids_within_distance(graph, start, max_distance);
    let members: HashSet<&NodeId> = ids.iter().collect();

    let nodes = ids.iter().filter_map(|id| graph.get(id.as_str())).map(|node| {
        let mut node: GraphNode = node.clone();
        node.outgoing_edges.retain(|e| members.contains(&e.target_id));
        node
    });

    Graph::from_nodes(nodes)
}

/// Nodes now within reach of `origin` that weren't in `previous`.
///
/// Returned in breadth-first order from `origin`.
pub fn newly_reachable(
    graph: &Graph,
    origin: &str,
    max_distance: usize,
    previous: &[NodeId],
) -> Vec<NodeId> {
    let known: HashSet<&NodeId> = previous.iter().collect();
    ids_within_distance(graph, origin, max_distance)
        .into_iter()
        .filter(|id| !known.contains(id))
        .collect()
}
