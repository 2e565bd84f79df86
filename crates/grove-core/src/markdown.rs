//! Markdown codec - turns a note file into a GraphNode.
//!
//! Identity comes from the frontmatter `node_id` when present, otherwise
//! from the file path. Edges come from `[[wikilinks]]` in the body; a
//! list item like `- child_of [[parent]]` labels the link "child of".

use crate::frontmatter::{extract_frontmatter, strip_frontmatter};
use crate::node::{Edge, GraphNode, NodeId, UiMetadata};
use crate::path::path_to_id;
use once_cell::sync::Lazy;
use regex::Regex;

/// Headings this long or longer are not used as titles.
pub const MAX_HEADING_TITLE_CHARS: usize = 100;

static WIKILINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]|]+)(?:\|[^\]]*)?\]\]").unwrap());
static LABELLED_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[-*]\s+([^\[\]]+?)\s*\[\[([^\]|]+)(?:\|[^\]]*)?\]\]").unwrap());
static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s+(.*\S)\s*$").unwrap());

/// Parses raw note text into a node.
///
/// Never fails: a note without frontmatter simply gets the
/// path-derived id and default metadata.
pub fn parse_node(content: &str, file_path: &str) -> GraphNode {
    let fm = extract_frontmatter(content);

    let id = match fm.node_id {
        Some(ref id) if !id.trim().is_empty() => NodeId::new(id.trim()),
        _ => path_to_id(file_path),
    };

    let ui_metadata = UiMetadata {
        color: fm.color,
        position: fm.position,
        is_context_node: fm.is_context_node.unwrap_or(false),
        contained_node_ids: fm.contained_node_ids,
        extra_frontmatter_fields: fm.extra,
    };

    GraphNode {
        id,
        outgoing_edges: extract_edges(strip_frontmatter(content)),
        content: content.to_string(),
        ui_metadata,
    }
}

/// Extracts links from a note body, in order of appearance.
///
/// Repeated `(target, label)` pairs are kept once.
pub fn extract_edges(body: &str) -> Vec<Edge> {
    let mut edges: Vec<Edge> = Vec::new();
    let mut push = |edge: Edge| {
        if !edges.contains(&edge) {
            edges.push(edge);
        }
    };

    for line in body.lines() {
        let mut rest = line;

        if let Some(caps) = LABELLED_LINK_RE.captures(line) {
            let label = caps[1].trim().replace('_', " ");
            push(Edge::new(link_target(&caps[2]), label));
            rest = &line[caps.get(0).map_or(0, |m| m.end())..];
        }

        for caps in WIKILINK_RE.captures_iter(rest) {
            push(Edge::to(link_target(&caps[1])));
        }
    }

    edges
}

fn link_target(raw: &str) -> NodeId {
    path_to_id(raw.trim())
}

/// Derives the display title of a node.
///
/// 1. frontmatter `title`
/// 2. the first heading line, if its text is under 100 characters
/// 3. the file name, with `_` and `-` turned into spaces
pub fn resolve_title(node: &GraphNode) -> String {
    let fm = extract_frontmatter(&node.content);
    if let Some(title) = fm.title {
        let title = title.trim();
        if !title.is_empty() {
            return title.to_string();
        }
    }

    if let Some(heading) = first_heading(strip_frontmatter(&node.content)) {
        if heading.chars().count() < MAX_HEADING_TITLE_CHARS {
            return heading.to_string();
        }
    }

    filename_title(&node.id)
}

/// Returns the text of the first heading line, if any.
fn first_heading(body: &str) -> Option<&str> {
    body.lines().find_map(|line| {
        HEADING_RE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    })
}

/// Humanizes the last path segment of an id.
pub fn filename_title(id: &NodeId) -> String {
    id.file_stem().replace(['_', '-'], " ")
}
