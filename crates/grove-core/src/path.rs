//! Mapping between vault paths and node ids.
//!
//! `path_to_id` and `id_to_path` are exact inverses for every valid
//! vault-relative path: `/`-separated, relative, ending in `.md`.

use crate::error::{CoreError, Result};
use crate::node::NodeId;
use std::path::{Component, Path};

/// Extension every note file carries.
pub const MARKDOWN_EXTENSION: &str = ".md";

/// Derives the node id for a vault-relative path by stripping one
/// trailing `.md`.
pub fn path_to_id(relative_path: &str) -> NodeId {
    let id = relative_path
        .strip_suffix(MARKDOWN_EXTENSION)
        .unwrap_or(relative_path);
    NodeId::new(id)
}

/// The vault-relative path a node id lives at.
pub fn id_to_path(id: &NodeId) -> String {
    format!("{}{}", id.as_str(), MARKDOWN_EXTENSION)
}

/// Whether a path names a note file.
pub fn is_markdown(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("md")
}

/// Turns a path reported by the watcher into a vault-relative,
/// `/`-separated note path.
///
/// Relative inputs are taken as already relative to `root`.
pub fn vault_relative_path(root: &Path, path: &Path) -> Result<String> {
    if !is_markdown(path) {
        return Err(CoreError::NotMarkdown(path.to_path_buf()));
    }

    let relative = if path.is_absolute() {
        path.strip_prefix(root)
            .map_err(|_| CoreError::InvalidPath(path.display().to_string()))?
    } else {
        path
    };

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => {
                let segment = segment
                    .to_str()
                    .ok_or_else(|| CoreError::InvalidPath(path.display().to_string()))?;
                segments.push(segment);
            }
            Component::CurDir => {}
            _ => return Err(CoreError::InvalidPath(path.display().to_string())),
        }
    }

    if segments.is_empty() {
        return Err(CoreError::InvalidPath(path.display().to_string()));
    }

    Ok(segments.join("/"))
}
