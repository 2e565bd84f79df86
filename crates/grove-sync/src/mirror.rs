//! The receiving side of replication.
//!
//! A mirror holds its own graph and runs the same reducer over the same
//! ordered envelopes as the engine, so after each envelope it equals the
//! engine's graph at that point.

use crate::error::{Result, SyncError};
use crate::protocol::{DeltaEnvelope, GraphSnapshot};
use grove_graph::{apply_graph_delta, Graph};
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct Mirror {
    graph: Graph,
    next_seq: u64,
}

impl Mirror {
    /// A mirror of an engine that hasn't broadcast anything yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A mirror hydrated from a full snapshot, expecting `next_seq` as
    /// the next envelope.
    pub fn from_snapshot(graph: Graph, next_seq: u64) -> Self {
        Self { graph, next_seq }
    }

    /// A mirror hydrated from a `graph/getGraph` result.
    pub fn hydrate(snapshot: GraphSnapshot) -> Self {
        Self::from_snapshot(snapshot.graph, snapshot.next_seq)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Applies one envelope.
    ///
    /// Envelopes already applied are ignored. An envelope from the
    /// future means something was lost; it is rejected and the graph
    /// stays as it was.
    pub fn apply(&mut self, envelope: &DeltaEnvelope) -> Result<()> {
        if envelope.seq < self.next_seq {
            debug!("Ignoring replayed delta {}", envelope.seq);
            return Ok(());
        }
        if envelope.seq > self.next_seq {
            warn!(
                "Sequence gap: expected delta {}, got {}",
                self.next_seq, envelope.seq
            );
            return Err(SyncError::SequenceGap {
                expected: self.next_seq,
                got: envelope.seq,
            });
        }

        self.graph = apply_graph_delta(&self.graph, &envelope.delta);
        self.next_seq += 1;
        Ok(())
    }

    /// Applies an envelope read as a JSON-RPC notification line.
    pub fn apply_line(&mut self, line: &str) -> Result<()> {
        let envelope = DeltaEnvelope::from_notification_line(line)?;
        self.apply(&envelope)
    }
}
