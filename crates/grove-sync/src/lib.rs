//! Grove Sync - keeping a second copy of the graph in step
//!
//! The engine owns the authoritative graph. Every delta it applies is
//! numbered and sent through a [`DeltaTransport`]; a [`Mirror`] on the
//! other side applies the same deltas in the same order with the same
//! reducer and ends up with the same graph.
//!
//! # Example
//!
//! ```
//! use grove_sync::{ChannelTransport, Mirror, SyncEngine};
//! use grove_watcher::{FilesystemEvent, LoadOptions};
//!
//! # tokio_test();
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn tokio_test() {
//! let (transport, mut rx) = ChannelTransport::new();
//! let mut engine = SyncEngine::new(transport, LoadOptions::default());
//! let mut mirror = Mirror::new();
//!
//! let event = FilesystemEvent::Added { path: "a.md".into(), content: "[[b]]".into() };
//! engine.handle_event(&event).await.unwrap();
//! mirror.apply(&rx.recv().await.unwrap()).unwrap();
//!
//! assert_eq!(mirror.graph(), engine.store().get().as_ref());
//! # }
//! ```

pub mod broadcaster;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod mirror;
pub mod protocol;
pub mod transport;

pub use broadcaster::Broadcaster;
pub use engine::SyncEngine;
pub use error::{Result, SyncError};
pub use handlers::handle_request;
pub use mirror::Mirror;
pub use protocol::{DeltaEnvelope, GraphSnapshot, Request, Response, RpcError, NODE_NOT_FOUND};
pub use transport::{ChannelTransport, DeltaTransport, JsonLineTransport};
