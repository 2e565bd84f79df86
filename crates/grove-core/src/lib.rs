//! Grove Core - note model and markdown codec
//!
//! This crate defines what a note looks like once it's in memory and
//! how raw markdown becomes one. Everything here is pure: no graph, no
//! filesystem watching, no I/O beyond the optional `read_note` helper.
//!
//! # Example
//!
//! ```
//! use grove_core::{parse_node, resolve_title};
//!
//! let node = parse_node("---\ncolor: teal\n---\n# Roses\nSee [[tulips]].", "garden/roses.md");
//! assert_eq!(node.id.as_str(), "garden/roses");
//! assert_eq!(resolve_title(&node), "Roses");
//! assert_eq!(node.outgoing_edges[0].target_id.as_str(), "tulips");
//! ```

pub mod error;
pub mod frontmatter;
pub mod markdown;
pub mod node;
pub mod path;

pub use error::{CoreError, Result};
pub use frontmatter::{extract_frontmatter, split_frontmatter, strip_frontmatter, Frontmatter};
pub use markdown::{extract_edges, filename_title, parse_node, resolve_title};
pub use node::{Edge, FrontmatterValue, GraphNode, NodeId, Point, UiMetadata};
pub use path::{id_to_path, is_markdown, path_to_id, vault_relative_path};

use std::fs;
use std::path::Path;

/// Reads and parses a note from disk.
///
/// `relative_path` is the vault-relative path used for identity.
pub fn read_note(root: &Path, relative_path: &str) -> Result<GraphNode> {
    let full = root.join(relative_path);
    let content = fs::read_to_string(&full).map_err(|e| CoreError::io(&full, e))?;
    Ok(parse_node(&content, relative_path))
}
