//! Context node capture.
//!
//! A context node is a synthetic note that snapshots everything within
//! a few hops of an origin note: it records which ids it captured and
//! inlines their text, so the whole neighbourhood can be handed to a
//! reader (or a model) as one document.
//!
//! The node is produced as markdown and parsed back with the regular
//! codec, so writing it to `ctx-nodes/` and letting the watcher pick it
//! up yields exactly the same node.

use crate::graph::Graph;
use crate::subgraph::{by_distance, newly_reachable};
use crate::traversal::ordered_ids;
use grove_core::{
    id_to_path, parse_node, resolve_title, strip_frontmatter, Frontmatter, GraphNode, NodeId,
};
use once_cell::sync::Lazy;
use regex::Regex;

/// Vault directory context nodes are written to.
pub const CONTEXT_DIR: &str = "ctx-nodes";

/// Label of the edge from a context node to its origin.
pub const CONTEXT_EDGE_LABEL: &str = "context of";

static WIKILINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]|]+)(?:\|([^\]]*))?\]\]").unwrap());

/// Id of the context node captured from `origin`.
///
/// Mirrors the origin's directory under `ctx-nodes/`, so origins that
/// share a file name in different folders get different context nodes.
pub fn context_node_id(origin: &NodeId) -> NodeId {
    NodeId::new(format!("{}/{}_context", CONTEXT_DIR, origin))
}

/// Captures the neighbourhood of `origin` as a context node.
///
/// `None` if `origin` isn't in the graph.
pub fn capture_context(
    graph: &Graph,
    origin: &str,
    max_distance: usize,
) -> grove_core::Result<Option<GraphNode>> {
    let origin_node = match graph.get(origin) {
        Some(node) => node,
        None => return Ok(None),
    };
    let sub = by_distance(graph, origin, max_distance);
    let contained = ordered_ids(&sub);
    let id = context_node_id(&origin_node.id);

    let title = format!("Context: {}", resolve_title(origin_node));
    let frontmatter = Frontmatter {
        title: Some(title.clone()),
        is_context_node: Some(true),
        contained_node_ids: Some(contained.clone()),
        ..Frontmatter::default()
    };

    let mut content = frontmatter.render()?;
    content.push_str(&format!("# {}\n\n", title));
    content.push_str(&format!(
        "- {} [[{}]]\n",
        CONTEXT_EDGE_LABEL.replace(' ', "_"),
        origin_node.id
    ));

    for member in contained.iter().filter_map(|id| sub.get(id.as_str())) {
        content.push_str(&format!(
            "\n{}\n## {}\n_{}_\n\n",
            "-".repeat(40),
            resolve_title(member),
            member.id
        ));
        content.push_str(&unlink(strip_frontmatter(&member.content)));
        if !content.ends_with('\n') {
            content.push('\n');
        }
    }

    Ok(Some(parse_node(&content, &id_to_path(&id))))
}

/// Nodes near a context node's origin that it didn't capture.
///
/// The origin is the target of the context node's first edge. Returns
/// an empty list for nodes that aren't context nodes.
pub fn refresh_context(graph: &Graph, context: &GraphNode, max_distance: usize) -> Vec<NodeId> {
    if !context.ui_metadata.is_context_node {
        return Vec::new();
    }
    let origin = match context.outgoing_edges.first() {
        Some(edge) => &edge.target_id,
        None => return Vec::new(),
    };
    let previous = context
        .ui_metadata
        .contained_node_ids
        .as_deref()
        .unwrap_or(&[]);

    newly_reachable(graph, origin.as_str(), max_distance, previous)
        .into_iter()
        .filter(|id| id != &context.id)
        .collect()
}

/// Replaces `[[target|text]]` with its display text so inlined notes
/// don't add edges to the context node.
fn unlink(body: &str) -> String {
    WIKILINK_RE
        .replace_all(body, |caps: &regex::Captures| {
            caps.get(2)
                .or_else(|| caps.get(1))
                .map_or(String::new(), |m| m.as_str().trim().to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::{apply_graph_delta, Delta};
    use grove_core::{parse_node, Edge};

    fn vault() -> Graph {
        Graph::from_nodes(vec![
            parse_node("# Roses\nRed ones. See [[tulips]] and [[soil|the soil]].", "garden/roses.md"),
            parse_node("# Tulips\nSpring.", "tulips.md"),
            parse_node("---\ntitle: Soil\n---\nLoam, see [[worms]].", "soil.md"),
            parse_node("Wriggly.", "worms.md"),
        ])
    }

    #[test]
    fn test_capture_context() {
        let graph = vault();
        let ctx = capture_context(&graph, "garden/roses", 1).unwrap().unwrap();

        assert_eq!(ctx.id.as_str(), "ctx-nodes/garden/roses_context");
        assert!(ctx.ui_metadata.is_context_node);
        assert_eq!(
            ctx.ui_metadata.contained_node_ids,
            Some(vec![
                NodeId::new("garden/roses"),
                NodeId::new("tulips"),
                NodeId::new("soil"),
            ])
        );
        assert_eq!(
            ctx.outgoing_edges,
            vec![Edge::new("garden/roses", CONTEXT_EDGE_LABEL)]
        );
        assert_eq!(resolve_title(&ctx), "Context: Roses");
        assert!(ctx.content.contains("Red ones. See tulips and the soil."));
        assert!(ctx.content.contains("Spring."));
        assert!(!ctx.content.contains("Wriggly."));
    }

    #[test]
    fn test_capture_round_trips_through_codec() {
        let graph = vault();
        let ctx = capture_context(&graph, "tulips", 2).unwrap().unwrap();

        let reparsed = parse_node(&ctx.content, &id_to_path(&ctx.id));
        assert_eq!(reparsed, ctx);
    }

    #[test]
    fn test_same_stem_in_different_folders() {
        let graph = Graph::from_nodes(vec![
            parse_node("Red.", "a/roses.md"),
            parse_node("White.", "b/roses.md"),
        ]);

        let first = capture_context(&graph, "a/roses", 1).unwrap().unwrap();
        let second = capture_context(&graph, "b/roses", 1).unwrap().unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(context_node_id(&NodeId::new("roses")).as_str(), "ctx-nodes/roses_context");
    }

    #[test]
    fn test_capture_missing_origin() {
        assert!(capture_context(&vault(), "nope", 3).unwrap().is_none());
    }

    #[test]
    fn test_refresh_finds_new_neighbours() {
        let graph = vault();
        let ctx = capture_context(&graph, "garden/roses", 1).unwrap().unwrap();
        let graph = apply_graph_delta(&graph, &Delta::new().upsert(ctx.clone()));
        assert!(refresh_context(&graph, &ctx, 1).is_empty());

        let graph = apply_graph_delta(
            &graph,
            &Delta::new().upsert(parse_node("Thorns on [[garden/roses]]", "thorns.md")),
        );

        assert_eq!(refresh_context(&graph, &ctx, 1), vec![NodeId::new("thorns")]);
    }

    #[test]
    fn test_refresh_ignores_plain_nodes() {
        let graph = vault();
        let node = graph.get("tulips").unwrap();
        assert!(refresh_context(&graph, node, 3).is_empty());
    }
}
