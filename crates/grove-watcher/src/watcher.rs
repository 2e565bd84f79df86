//! Vault watcher.
//!
//! Uses the notify crate to watch the vault and turns raw notifications
//! into vault-relative [`FilesystemEvent`]s with the file content
//! already read.

use crate::error::WatchError;
use crate::loader::is_visible;
use crate::mapper::FilesystemEvent;
use grove_core::{is_markdown, vault_relative_path};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Watches a vault directory for note changes.
pub struct VaultWatcher {
    #[allow(dead_code)]
    watcher: notify::RecommendedWatcher,
    receiver: Receiver<FilesystemEvent>,
    root: PathBuf,
}

impl VaultWatcher {
    /// Starts watching `root` recursively.
    ///
    /// Notes under any of `excluded_dirs`, hidden notes and gitignored
    /// notes are ignored, matching what a load would see.
    pub fn new(root: &Path, excluded_dirs: Vec<String>) -> Result<Self, WatchError> {
        if !root.is_dir() {
            return Err(WatchError::MissingRoot(root.to_path_buf()));
        }
        let root = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
        let (tx, rx) = channel();

        let callback_root = root.clone();
        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    for path in &event.paths {
                        let Some(change) =
                            to_filesystem_event(&event.kind, path, &callback_root, &excluded_dirs)
                        else {
                            continue;
                        };
                        if tx.send(change).is_err() {
                            warn!("Failed to send filesystem event");
                        }
                    }
                }
                Err(e) => warn!("Watch error: {}", e),
            }
        })?;

        watcher.watch(&root, RecursiveMode::Recursive)?;

        info!("Watching {} for changes", root.display());

        Ok(Self {
            watcher,
            receiver: rx,
            root,
        })
    }

    /// The canonical root being watched.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns immediately with any pending events.
    pub fn poll(&self) -> Vec<FilesystemEvent> {
        self.receiver.try_iter().collect()
    }

    /// Blocks until the next event. `None` once the watcher has stopped.
    pub fn recv(&self) -> Option<FilesystemEvent> {
        self.receiver.recv().ok()
    }

    /// Waits for the next event with a timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<FilesystemEvent> {
        self.receiver.recv_timeout(timeout).ok()
    }
}

/// Translates one notify notification for one path.
///
/// Notes `load_vault` would skip are skipped here too.
/// Creates and modifies read the file; if it's gone by then, the event
/// becomes a delete. Renames are resolved by checking whether the path
/// still exists.
pub(crate) fn to_filesystem_event(
    kind: &EventKind,
    path: &Path,
    root: &Path,
    excluded_dirs: &[String],
) -> Option<FilesystemEvent> {
    if !is_markdown(path) {
        return None;
    }
    let relative = match vault_relative_path(root, path) {
        Ok(relative) => relative,
        Err(e) => {
            debug!("Ignoring {}: {}", path.display(), e);
            return None;
        }
    };
    if !is_visible(root, &relative, excluded_dirs) {
        debug!("Ignoring {}: not part of the vault", relative);
        return None;
    }

    match kind {
        EventKind::Remove(_) => {
            debug!("Note deleted: {}", relative);
            Some(FilesystemEvent::Deleted { path: relative })
        }
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(_)) => {
            read_or_deleted(path, relative, true)
        }
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        EventKind::Modify(_) => read_or_deleted(path, relative, false),
        _ => None,
    }
}

fn read_or_deleted(path: &Path, relative: String, created: bool) -> Option<FilesystemEvent> {
    match fs::read_to_string(path) {
        Ok(content) if created => {
            debug!("Note created: {}", relative);
            Some(FilesystemEvent::Added {
                path: relative,
                content,
            })
        }
        Ok(content) => {
            debug!("Note modified: {}", relative);
            Some(FilesystemEvent::Changed {
                path: relative,
                content,
            })
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Note vanished: {}", relative);
            Some(FilesystemEvent::Deleted { path: relative })
        }
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            None
        }
    }
}
