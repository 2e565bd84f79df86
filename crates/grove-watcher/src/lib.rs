//! Grove Watcher - from files on disk to graph deltas
//!
//! Three pieces live here:
//!
//! - [`map_event`] and [`EventMapper`] turn a filesystem event into a delta
//! - [`load_vault`] walks a vault and produces the initial delta
//! - [`VaultWatcher`] listens for edits and emits events as they happen

pub mod error;
pub mod loader;
pub mod mapper;
pub mod watcher;

pub use error::{MapperError, WatchError};
pub use loader::{
    is_excluded, is_gitignored, is_visible, load_vault, LoadOptions, LoadResult,
    DEFAULT_EXCLUDED_DIRS,
};
pub use mapper::{map_event, EventMapper, FilesystemEvent};
pub use watcher::VaultWatcher;
