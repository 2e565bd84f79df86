//! Note node representation.
//!
//! A GraphNode is one markdown file in the vault: its identity, the
//! links it makes to other notes, the raw text, and the bits of
//! frontmatter the UI cares about. Titles are never stored here; they
//! are derived from `content` whenever someone asks.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;

/// Identity of a note.
///
/// Normally the vault-relative path with `.md` stripped
/// (`projects/garden.md` -> `projects/garden`), unless the file's
/// frontmatter carries a `node_id` override.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last `/`-separated segment of the id.
    pub fn file_stem(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A directed, labelled link from one note to another.
///
/// The target may not exist (yet). Dangling edges are legal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub target_id: NodeId,
    /// Relationship text, e.g. "child of". Empty for bare links.
    pub label: String,
}

impl Edge {
    pub fn new(target_id: impl Into<NodeId>, label: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            label: label.into(),
        }
    }

    /// An unlabelled edge.
    pub fn to(target_id: impl Into<NodeId>) -> Self {
        Self::new(target_id, "")
    }
}

/// Canvas position of a node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A frontmatter value we don't interpret but must carry through.
///
/// Only scalars are representable; nested sequences and mappings under
/// unknown keys are dropped at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrontmatterValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl std::fmt::Display for FrontmatterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::String(s) => write!(f, "{}", s),
        }
    }
}

/// Presentation state carried alongside a node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,

    /// True for synthetic nodes produced by context capture.
    #[serde(default)]
    pub is_context_node: bool,

    /// For context nodes: the ids captured at creation time, in order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contained_node_ids: Option<Vec<NodeId>>,

    /// Frontmatter keys we don't know about, preserved as-is.
    #[serde(default)]
    pub extra_frontmatter_fields: BTreeMap<String, FrontmatterValue>,
}

/// A note in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: NodeId,

    /// Links in the order they appear in the note.
    pub outgoing_edges: Vec<Edge>,

    /// Raw file text, frontmatter included.
    pub content: String,

    pub ui_metadata: UiMetadata,
}

impl GraphNode {
    /// Creates an empty node with the given id.
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            outgoing_edges: Vec::new(),
            content: String::new(),
            ui_metadata: UiMetadata::default(),
        }
    }

    /// Builder pattern: set outgoing edges.
    pub fn with_edges(mut self, edges: Vec<Edge>) -> Self {
        self.outgoing_edges = edges;
        self
    }

    /// Builder pattern: set raw content.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Builder pattern: set UI metadata.
    pub fn with_metadata(mut self, ui_metadata: UiMetadata) -> Self {
        self.ui_metadata = ui_metadata;
        self
    }

    /// Whether any outgoing edge points at `target`.
    pub fn links_to(&self, target: &str) -> bool {
        self.outgoing_edges
            .iter()
            .any(|e| e.target_id.as_str() == target)
    }
}
