//! Filesystem events to graph deltas.
//!
//! [`map_event`] is the pure mapping: one event, one operation.
//! [`EventMapper`] wraps it with a record of which file owns which id,
//! so a frontmatter `node_id` can't silently take over another note.
//! Rejected files wait in line for the id and take it over once the
//! owner lets go.

use crate::error::MapperError;
use grove_core::{parse_node, path_to_id, GraphNode, NodeId};
use grove_graph::{Delta, NodeDelta};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// A change to one note file, with a vault-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilesystemEvent {
    Added { path: String, content: String },
    Changed { path: String, content: String },
    Deleted { path: String },
}

impl FilesystemEvent {
    pub fn path(&self) -> &str {
        match self {
            FilesystemEvent::Added { path, .. }
            | FilesystemEvent::Changed { path, .. }
            | FilesystemEvent::Deleted { path } => path,
        }
    }
}

/// Maps one event to a one-operation delta.
///
/// Added and Changed parse the content and upsert the node; Deleted
/// removes the path-derived id.
pub fn map_event(event: &FilesystemEvent) -> Delta {
    match event {
        FilesystemEvent::Added { path, content } | FilesystemEvent::Changed { path, content } => {
            Delta::new().upsert(parse_node(content, path))
        }
        FilesystemEvent::Deleted { path } => Delta::new().delete(path_to_id(path)),
    }
}

/// Event mapping with id ownership tracking.
///
/// The first file to claim an id owns it until that file is deleted or
/// stops producing the id. Later claims are rejected but remembered, and
/// the earliest waiting claimant is upserted when the id is released.
#[derive(Debug, Default)]
pub struct EventMapper {
    owners: HashMap<NodeId, String>,
    ids_by_path: HashMap<String, NodeId>,
    pending: HashMap<NodeId, Vec<(String, GraphNode)>>,
}

impl EventMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps an event, updating ownership on success.
    pub fn map(&mut self, event: &FilesystemEvent) -> Result<Delta, MapperError> {
        match event {
            FilesystemEvent::Added { path, content }
            | FilesystemEvent::Changed { path, content } => {
                let node = parse_node(content, path);
                self.withdraw(path);

                if let Some(owner) = self.owners.get(&node.id) {
                    if owner != path {
                        warn!(
                            "Rejected {}: id '{}' already belongs to {}",
                            path, node.id, owner
                        );
                        let err = MapperError::IdCollision {
                            id: node.id.clone(),
                            path: path.clone(),
                            owner: owner.clone(),
                        };
                        self.pending
                            .entry(node.id.clone())
                            .or_default()
                            .push((path.clone(), node));
                        return Err(err);
                    }
                }

                let mut delta = Delta::new();
                self.release_previous(path, &node.id, &mut delta);

                debug!("Upsert {} from {}", node.id, path);
                self.owners.insert(node.id.clone(), path.clone());
                self.ids_by_path.insert(path.clone(), node.id.clone());
                delta.push(NodeDelta::UpsertNode { node });
                Ok(delta)
            }
            FilesystemEvent::Deleted { path } => {
                self.withdraw(path);
                let id = self
                    .ids_by_path
                    .remove(path)
                    .unwrap_or_else(|| path_to_id(path));
                match self.owners.get(&id) {
                    Some(owner) if owner != path => {
                        debug!("Ignoring delete of {}: {} belongs to {}", path, id, owner);
                        return Ok(Delta::new());
                    }
                    Some(_) => {
                        self.owners.remove(&id);
                    }
                    None => {}
                }
                debug!("Delete {} ({})", id, path);
                let mut delta = Delta::new().delete(id.clone());
                self.promote(&id, &mut delta);
                Ok(delta)
            }
        }
    }

    /// Drops the id `path` owned if it now produces `next` instead.
    fn release_previous(&mut self, path: &str, next: &NodeId, delta: &mut Delta) {
        let Some(previous) = self.ids_by_path.get(path).cloned() else {
            return;
        };
        if previous == *next {
            return;
        }
        debug!("{} changed id from {} to {}", path, previous, next);
        self.ids_by_path.remove(path);
        self.owners.remove(&previous);
        delta.push(NodeDelta::DeleteNode {
            node_id: previous.clone(),
        });
        self.promote(&previous, delta);
    }

    /// Hands a released id to the earliest file still waiting for it.
    fn promote(&mut self, id: &NodeId, delta: &mut Delta) {
        let Some(claimants) = self.pending.get_mut(id) else {
            return;
        };
        let (path, node) = claimants.remove(0);
        if claimants.is_empty() {
            self.pending.remove(id);
        }

        info!("{} takes over id '{}'", path, id);
        self.release_previous(&path, id, delta);
        self.owners.insert(id.clone(), path.clone());
        self.ids_by_path.insert(path, id.clone());
        delta.push(NodeDelta::UpsertNode { node });
    }

    /// Removes `path` from every waiting list.
    fn withdraw(&mut self, path: &str) {
        self.pending.retain(|_, claimants| {
            claimants.retain(|(claimant, _)| claimant != path);
            !claimants.is_empty()
        });
    }

    /// The file currently owning `id`, if any.
    pub fn owner_of(&self, id: &str) -> Option<&str> {
        self.owners.get(id).map(String::as_str)
    }

    /// Forgets all ownership, e.g. when switching vaults.
    pub fn reset(&mut self) {
        self.owners.clear();
        self.ids_by_path.clear();
        self.pending.clear();
    }
}
