//! Deterministic node ordering for rendering.
//!
//! Depth-first from every root (a node nothing links to), following
//! links in the order they appear. Each node is emitted once, at its
//! first encounter. Cycles with no outside referrer have no root, so a
//! second pass starts from any node still unvisited, in map order.

use crate::graph::Graph;
use grove_core::NodeId;
use std::collections::HashSet;

/// All node ids in traversal order.
pub fn ordered_ids(graph: &Graph) -> Vec<NodeId> {
    let mut visited: HashSet<&NodeId> = HashSet::with_capacity(graph.node_count());
    let mut order = Vec::with_capacity(graph.node_count());

    let roots = graph
        .ids()
        .filter(|id| graph.incoming_ids(id.as_str()).is_empty());
    for root in roots {
        walk(graph, root, &mut visited, &mut order);
    }

    // Islands: cycles nobody outside links into
    for id in graph.ids() {
        if !visited.contains(id) {
            walk(graph, id, &mut visited, &mut order);
        }
    }

    order
}

/// Ids reachable from roots only, without the island pass.
pub fn ordered_ids_from_roots(graph: &Graph) -> Vec<NodeId> {
    let mut visited: HashSet<&NodeId> = HashSet::new();
    let mut order = Vec::new();

    for root in graph
        .ids()
        .filter(|id| graph.incoming_ids(id.as_str()).is_empty())
    {
        walk(graph, root, &mut visited, &mut order);
    }

    order
}

fn walk<'g>(
    graph: &'g Graph,
    start: &'g NodeId,
    visited: &mut HashSet<&'g NodeId>,
    order: &mut Vec<NodeId>,
) {
    let mut stack: Vec<&'g NodeId> = vec![start];

    while let Some(id) = stack.pop() {
        if visited.contains(id) {
            continue;
        }
        let node = match graph.get(id.as_str()) {
            Some(node) => node,
            None => continue,
        };

        visited.insert(&node.id);
        order.push(node.id.clone());

        // Reverse so the first link is explored first
        for edge in node.outgoing_edges.iter().rev() {
            if !visited.contains(&edge.target_id) {
                stack.push(&edge.target_id);
            }
        }
    }
}
