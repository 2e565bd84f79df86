//! Forwards applied deltas to the mirror.
//!
//! The broadcaster numbers every delta it sends. Numbers are consumed
//! even when a send fails, so a lost delta shows up on the other side as
//! a sequence gap rather than as silent drift.

use crate::error::Result;
use crate::protocol::DeltaEnvelope;
use crate::transport::DeltaTransport;
use grove_graph::Delta;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

pub struct Broadcaster {
    transport: Box<dyn DeltaTransport>,
    next_seq: AtomicU64,
}

impl Broadcaster {
    pub fn new(transport: impl DeltaTransport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Sequence number the next broadcast will carry.
    pub fn next_seq(&self) -> u64 {
        self.next_seq.load(Ordering::SeqCst)
    }

    /// Sends `delta` and returns its sequence number.
    ///
    /// Empty deltas aren't sent and don't consume a number.
    pub async fn broadcast(&self, delta: &Delta) -> Result<Option<u64>> {
        if delta.is_empty() {
            return Ok(None);
        }

        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let envelope = DeltaEnvelope::new(seq, delta.clone());

        match self.transport.send(&envelope).await {
            Ok(()) => {
                debug!("Broadcast delta {} ({} ops)", seq, delta.len());
                Ok(Some(seq))
            }
            Err(e) => {
                warn!("Failed to broadcast delta {}: {}", seq, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ChannelTransport;

    #[tokio::test]
    async fn test_sequence_numbers() {
        let (transport, mut rx) = ChannelTransport::new();
        let broadcaster = Broadcaster::new(transport);

        assert_eq!(broadcaster.broadcast(&Delta::new().delete("a")).await.unwrap(), Some(0));
        assert_eq!(broadcaster.broadcast(&Delta::new()).await.unwrap(), None);
        assert_eq!(broadcaster.broadcast(&Delta::new().delete("b")).await.unwrap(), Some(1));

        assert_eq!(rx.recv().await.unwrap().seq, 0);
        assert_eq!(rx.recv().await.unwrap().seq, 1);
        assert_eq!(broadcaster.next_seq(), 2);
    }

    #[tokio::test]
    async fn test_failed_send_consumes_number() {
        let (transport, rx) = ChannelTransport::new();
        drop(rx);
        let broadcaster = Broadcaster::new(transport);

        assert!(broadcaster.broadcast(&Delta::new().delete("a")).await.is_err());
        assert_eq!(broadcaster.next_seq(), 1);
    }
}
