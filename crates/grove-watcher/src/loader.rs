//! Initial vault load.
//!
//! Walks the vault, reads every note and turns the lot into a single
//! delta that takes an empty graph to the vault's current state.

use crate::mapper::{EventMapper, FilesystemEvent};
use grove_core::{is_markdown, vault_relative_path};
use grove_graph::Delta;
use ignore::gitignore::GitignoreBuilder;
use ignore::{Match, WalkBuilder};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Directories skipped by default. Hidden directories are always skipped.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[".obsidian", ".git", "node_modules", ".grove"];

/// Result of loading a vault.
#[derive(Debug)]
pub struct LoadResult {
    /// Upserts for every note that loaded, in walk order.
    pub delta: Delta,

    /// Number of notes turned into nodes.
    pub files_loaded: usize,

    /// Time taken in milliseconds.
    pub duration_ms: u64,

    /// Notes that couldn't be loaded, with the reason.
    pub errors: Vec<(String, String)>,
}

/// Options for loading a vault.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Follow symbolic links when walking directories.
    pub follow_symlinks: bool,

    /// Directory names to skip wherever they appear.
    pub excluded_dirs: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// Whether any component of a vault-relative path is an excluded directory.
pub fn is_excluded(relative_path: &str, excluded_dirs: &[String]) -> bool {
    let mut segments: Vec<&str> = relative_path.split('/').collect();
    segments.pop();
    segments
        .iter()
        .any(|segment| excluded_dirs.iter().any(|dir| dir == segment))
}

/// Whether a note would be picked up by [`load_vault`]: not hidden, not
/// under an excluded directory and not matched by a `.gitignore` inside
/// the vault.
pub fn is_visible(root: &Path, relative_path: &str, excluded_dirs: &[String]) -> bool {
    !is_hidden(relative_path)
        && !is_excluded(relative_path, excluded_dirs)
        && !is_gitignored(root, relative_path)
}

fn is_hidden(relative_path: &str) -> bool {
    relative_path.split('/').any(|segment| segment.starts_with('.'))
}

/// Checks the `.gitignore` files between the vault root and the note.
///
/// The deepest file with a matching rule decides, as in git.
pub fn is_gitignored(root: &Path, relative_path: &str) -> bool {
    let segments: Vec<&str> = relative_path.split('/').collect();
    let full = segments.iter().fold(root.to_path_buf(), |p, s| p.join(s));

    for depth in (0..segments.len()).rev() {
        let dir = segments[..depth]
            .iter()
            .fold(root.to_path_buf(), |p, s| p.join(s));
        let file = dir.join(".gitignore");
        if !file.is_file() {
            continue;
        }

        let mut builder = GitignoreBuilder::new(&dir);
        if let Some(e) = builder.add(&file) {
            debug!("Problem in {}: {}", file.display(), e);
        }
        let matcher = match builder.build() {
            Ok(matcher) => matcher,
            Err(e) => {
                warn!("Ignoring {}: {}", file.display(), e);
                continue;
            }
        };

        match matcher.matched_path_or_any_parents(&full, false) {
            Match::Ignore(_) => return true,
            Match::Whitelist(_) => return false,
            Match::None => {}
        }
    }

    false
}

/// Loads every note under `root`.
///
/// Notes are mapped through `mapper`, so id collisions inside the vault
/// are caught the same way they are for live events. Files that can't
/// be read or mapped end up in `errors`; the rest still load. Fails only
/// if `root` itself can't be resolved.
///
/// # Example
///
/// ```no_run
/// use grove_watcher::{load_vault, EventMapper, LoadOptions};
/// use std::path::Path;
///
/// let mut mapper = EventMapper::new();
/// let result = load_vault(Path::new("./vault"), &LoadOptions::default(), &mut mapper).unwrap();
/// println!("Loaded {} notes", result.files_loaded);
/// ```
pub fn load_vault(
    root: &Path,
    options: &LoadOptions,
    mapper: &mut EventMapper,
) -> Result<LoadResult, std::io::Error> {
    let start = Instant::now();
    let mut delta = Delta::new();
    let mut files_loaded = 0;
    let mut errors = Vec::new();

    let root = &fs::canonicalize(root)?;
    info!("Loading vault {}", root.display());

    let excluded = options.excluded_dirs.clone();
    // Only .gitignore files inside the vault apply, git repo or not
    let walker = WalkBuilder::new(root)
        .hidden(true)
        .ignore(false)
        .parents(false)
        .require_git(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(false)
        .follow_links(options.follow_symlinks)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| excluded.iter().any(|dir| dir == name)))
        })
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Walk error: {}", e);
                errors.push((root.display().to_string(), e.to_string()));
                continue;
            }
        };
        let path = entry.path();

        if path.is_dir() || !is_markdown(path) {
            continue;
        }

        let relative = match vault_relative_path(root, path) {
            Ok(relative) => relative,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                errors.push((path.display().to_string(), e.to_string()));
                continue;
            }
        };

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                errors.push((relative, e.to_string()));
                continue;
            }
        };

        debug!("Loading {}", relative);
        let event = FilesystemEvent::Added {
            path: relative.clone(),
            content,
        };
        match mapper.map(&event) {
            Ok(mapped) => {
                delta.extend(mapped);
                files_loaded += 1;
            }
            Err(e) => errors.push((relative, e.to_string())),
        }
    }

    let duration = start.elapsed();

    info!(
        "Loaded {} notes ({} errors) in {:?}",
        files_loaded,
        errors.len(),
        duration
    );

    Ok(LoadResult {
        delta,
        files_loaded,
        duration_ms: duration.as_millis() as u64,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_graph::{apply_graph_delta, Graph};
    use tempfile::tempdir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_load_vault() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.md", "# A\n[[b]] and [[sub/c]]");
        write(dir.path(), "b.md", "B");
        write(dir.path(), "sub/c.md", "C");
        write(dir.path(), "readme.txt", "not a note");

        let mut mapper = EventMapper::new();
        let result = load_vault(dir.path(), &LoadOptions::default(), &mut mapper).unwrap();

        assert_eq!(result.files_loaded, 3);
        assert!(result.errors.is_empty());

        let graph = apply_graph_delta(&Graph::empty(), &result.delta);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.incoming_ids("sub/c").len(), 1);
    }

    #[test]
    fn test_load_skips_excluded_and_hidden() {
        let dir = tempdir().unwrap();
        write(dir.path(), "kept.md", "kept");
        write(dir.path(), "node_modules/pkg/readme.md", "nope");
        write(dir.path(), ".obsidian/workspace.md", "nope");
        write(dir.path(), ".hidden/secret.md", "nope");
        write(dir.path(), "ctx-nodes/kept_context.md", "context");

        let mut mapper = EventMapper::new();
        let result = load_vault(dir.path(), &LoadOptions::default(), &mut mapper).unwrap();

        let graph = apply_graph_delta(&Graph::empty(), &result.delta);
        let ids: Vec<&str> = graph.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["ctx-nodes/kept_context", "kept"]);
    }

    #[test]
    fn test_load_records_collisions() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.md", "---\nnode_id: b\n---\nclaims b");
        write(dir.path(), "b.md", "the real b");

        let mut mapper = EventMapper::new();
        let result = load_vault(dir.path(), &LoadOptions::default(), &mut mapper).unwrap();

        assert_eq!(result.files_loaded, 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].0, "b.md");
        assert_eq!(mapper.owner_of("b"), Some("a.md"));
    }

    #[test]
    fn test_load_honours_gitignore_without_repo() {
        let dir = tempdir().unwrap();
        write(dir.path(), ".gitignore", "ignored/\n");
        write(dir.path(), "ignored/i.md", "nope");
        write(dir.path(), "sub/.gitignore", "skip.md\n");
        write(dir.path(), "sub/skip.md", "nope");
        write(dir.path(), "sub/keep.md", "kept");

        let mut mapper = EventMapper::new();
        let result = load_vault(dir.path(), &LoadOptions::default(), &mut mapper).unwrap();

        assert_eq!(result.files_loaded, 1);
        assert!(is_gitignored(dir.path(), "ignored/i.md"));
        assert!(is_gitignored(dir.path(), "sub/skip.md"));
        assert!(!is_gitignored(dir.path(), "sub/keep.md"));
    }

    #[test]
    fn test_is_visible() {
        let dir = tempdir().unwrap();
        let excluded = vec!["node_modules".to_string()];
        assert!(is_visible(dir.path(), "notes/a.md", &excluded));
        assert!(!is_visible(dir.path(), ".hidden/a.md", &excluded));
        assert!(!is_visible(dir.path(), "notes/.draft.md", &excluded));
        assert!(!is_visible(dir.path(), "node_modules/a.md", &excluded));
    }

    #[test]
    fn test_is_excluded() {
        let excluded = vec![".git".to_string(), "node_modules".to_string()];
        assert!(is_excluded("node_modules/x.md", &excluded));
        assert!(is_excluded("a/.git/b.md", &excluded));
        assert!(!is_excluded("node_modules.md", &excluded));
        assert!(!is_excluded("notes/a.md", &excluded));
    }
}
