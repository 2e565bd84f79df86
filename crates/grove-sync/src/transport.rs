//! Transports that carry delta envelopes to a mirror.
//!
//! Replication is only correct if the transport delivers envelopes in
//! order and without loss. Both transports here do: an in-process
//! unbounded channel, and a byte stream of newline-delimited JSON.

use crate::error::{Result, SyncError};
use crate::protocol::DeltaEnvelope;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;

/// Something that can ship an envelope to the other side.
#[async_trait]
pub trait DeltaTransport: Send + Sync {
    async fn send(&self, envelope: &DeltaEnvelope) -> Result<()>;
}

#[async_trait]
impl<T> DeltaTransport for Arc<T>
where
    T: DeltaTransport + ?Sized,
{
    async fn send(&self, envelope: &DeltaEnvelope) -> Result<()> {
        (**self).send(envelope).await
    }
}

/// In-process transport over a tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: UnboundedSender<DeltaEnvelope>,
}

impl ChannelTransport {
    /// Creates the transport and the receiving end for the mirror.
    pub fn new() -> (Self, UnboundedReceiver<DeltaEnvelope>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl DeltaTransport for ChannelTransport {
    async fn send(&self, envelope: &DeltaEnvelope) -> Result<()> {
        self.tx
            .send(envelope.clone())
            .map_err(|_| SyncError::Transport("mirror channel closed".to_string()))
    }
}

/// Writes each envelope as one JSON-RPC notification line.
pub struct JsonLineTransport<W> {
    writer: Mutex<W>,
}

impl<W> JsonLineTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    /// Writes one raw line, e.g. a response to a request, without
    /// interleaving it with a delta.
    pub async fn write_line(&self, line: &str) -> Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl<W> DeltaTransport for JsonLineTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&self, envelope: &DeltaEnvelope) -> Result<()> {
        let line = envelope.to_notification_line()?;
        self.write_line(&line).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_core::GraphNode;
    use grove_graph::Delta;

    #[tokio::test]
    async fn test_channel_transport() {
        let (transport, mut rx) = ChannelTransport::new();
        let envelope = DeltaEnvelope::new(0, Delta::new().upsert(GraphNode::new("a")));

        transport.send(&envelope).await.unwrap();

        assert_eq!(rx.recv().await, Some(envelope));
    }

    #[tokio::test]
    async fn test_channel_closed() {
        let (transport, rx) = ChannelTransport::new();
        drop(rx);

        let result = transport
            .send(&DeltaEnvelope::new(0, Delta::new()))
            .await;
        assert!(matches!(result, Err(SyncError::Transport(_))));
    }

    #[tokio::test]
    async fn test_json_line_transport() {
        let transport = JsonLineTransport::new(Vec::new());
        transport
            .send(&DeltaEnvelope::new(0, Delta::new().delete("a")))
            .await
            .unwrap();
        transport
            .send(&DeltaEnvelope::new(1, Delta::new().delete("b")))
            .await
            .unwrap();

        transport.write_line("{}").await.unwrap();

        let written = String::from_utf8(transport.into_inner()).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            DeltaEnvelope::from_notification_line(lines[1]).unwrap().seq,
            1
        );
        assert_eq!(lines[2], "{}");
    }

    #[tokio::test]
    async fn test_shared_transport() {
        let (transport, mut rx) = ChannelTransport::new();
        let shared = Arc::new(transport);

        shared
            .send(&DeltaEnvelope::new(0, Delta::new().delete("a")))
            .await
            .unwrap();

        assert_eq!(rx.recv().await.unwrap().seq, 0);
    }
}
