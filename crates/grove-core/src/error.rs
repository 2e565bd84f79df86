//! Error types for the core crate.
//!
//! Parsing note content never fails (bad frontmatter degrades to
//! defaults), so the only errors here are about paths and disk access.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience type for fallible core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Things that can go wrong when turning files into notes.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Couldn't read the note from disk.
    #[error("failed to read file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The path is not inside the vault or can't be expressed as a
    /// vault-relative, `/`-separated path.
    #[error("invalid vault path '{0}'")]
    InvalidPath(String),

    /// The file doesn't have the `.md` extension, so it isn't a note.
    #[error("not a markdown file: '{0}'")]
    NotMarkdown(PathBuf),

    /// Frontmatter couldn't be rendered back to YAML.
    #[error("failed to render frontmatter: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CoreError {
    /// Creates an IO error with the path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
