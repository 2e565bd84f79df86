//! The authoritative side of replication.
//!
//! `SyncEngine` is the single writer: filesystem events go in one at a
//! time, each is mapped to a delta, applied to the store and then
//! broadcast. Callers must feed events in arrival order.

use crate::broadcaster::Broadcaster;
use crate::error::Result;
use crate::transport::DeltaTransport;
use grove_graph::{Delta, Graph, GraphStore};
use grove_watcher::{load_vault, EventMapper, FilesystemEvent, LoadOptions, LoadResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub struct SyncEngine {
    store: Arc<GraphStore>,
    mapper: EventMapper,
    broadcaster: Broadcaster,
    options: LoadOptions,
    root: Option<PathBuf>,
}

impl SyncEngine {
    /// Creates an engine with an empty graph.
    pub fn new(transport: impl DeltaTransport + 'static, options: LoadOptions) -> Self {
        Self {
            store: Arc::new(GraphStore::new()),
            mapper: EventMapper::new(),
            broadcaster: Broadcaster::new(transport),
            options,
            root: None,
        }
    }

    /// Shared handle on the store, for answering read requests.
    pub fn store(&self) -> Arc<GraphStore> {
        Arc::clone(&self.store)
    }

    /// The vault currently loaded, if any.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Sequence number of the next broadcast delta.
    pub fn next_seq(&self) -> u64 {
        self.broadcaster.next_seq()
    }

    /// The current graph together with the sequence number of the first
    /// delta not yet applied to it.
    ///
    /// Every commit applies and broadcasts before returning, so between
    /// calls to `handle_event` the two always agree.
    pub fn snapshot(&self) -> (Arc<Graph>, u64) {
        (self.store.get(), self.broadcaster.next_seq())
    }

    /// Maps, applies and broadcasts one filesystem event.
    ///
    /// Returns the broadcast sequence number, or `None` if the event
    /// changed nothing. A rejected event leaves the graph untouched.
    pub async fn handle_event(&mut self, event: &FilesystemEvent) -> Result<Option<u64>> {
        let delta = self.mapper.map(event)?;
        debug!("{} -> {} ops", event.path(), delta.len());
        self.commit(&delta).await
    }

    /// Loads a vault into the graph as one delta.
    pub async fn load(&mut self, root: &Path) -> Result<LoadResult> {
        let result = load_vault(root, &self.options, &mut self.mapper)?;
        self.commit(&result.delta).await?;
        self.root = Some(root.to_path_buf());
        Ok(result)
    }

    /// Replaces the loaded vault with another one.
    ///
    /// The mirror first receives a delta deleting every known node, then
    /// the new vault's initial delta.
    pub async fn switch_vault(&mut self, root: &Path) -> Result<LoadResult> {
        info!("Switching vault to {}", root.display());
        let clear = self.store.reset();
        self.mapper.reset();
        self.root = None;
        self.broadcaster.broadcast(&clear).await?;
        self.load(root).await
    }

    async fn commit(&self, delta: &Delta) -> Result<Option<u64>> {
        if delta.is_empty() {
            return Ok(None);
        }
        self.store.apply(delta);
        self.broadcaster.broadcast(delta).await
    }
}
