//! JSON-RPC protocol types.
//!
//! Deltas cross the process boundary as JSON-RPC 2.0 notifications, one
//! per line. The mirror side can also ask for a node or the whole graph
//! with ordinary requests.

use crate::error::{Result, SyncError};
use grove_graph::{Delta, Graph};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Notification carrying a delta envelope.
pub const METHOD_DELTA: &str = "graph/delta";

/// Request for a single node by id.
pub const METHOD_GET_NODE: &str = "graph/getNode";

/// Request for the whole graph, answered with a [`GraphSnapshot`].
pub const METHOD_GET_GRAPH: &str = "graph/getGraph";

/// Error code for a node the requester expected to exist.
pub const NODE_NOT_FOUND: i32 = -32004;

/// A delta tagged with its position in the broadcast stream.
///
/// Sequence numbers start at 0 and increase by one per broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaEnvelope {
    pub seq: u64,
    pub delta: Delta,
}

impl DeltaEnvelope {
    pub fn new(seq: u64, delta: Delta) -> Self {
        Self { seq, delta }
    }

    /// Serializes as a single JSON-RPC notification line, without the
    /// trailing newline.
    pub fn to_notification_line(&self) -> Result<String> {
        Ok(serde_json::to_string(&Notification::new(METHOD_DELTA, self)?)?)
    }

    /// Parses a line written by [`to_notification_line`](Self::to_notification_line).
    pub fn from_notification_line(line: &str) -> Result<Self> {
        let notification: Notification = serde_json::from_str(line)?;
        if notification.method != METHOD_DELTA {
            return Err(SyncError::Transport(format!(
                "expected {} notification, got {}",
                METHOD_DELTA, notification.method
            )));
        }
        Ok(serde_json::from_value(notification.params)?)
    }
}

/// The whole graph plus the sequence number of the first delta that
/// isn't already part of it.
///
/// A mirror hydrated from a snapshot applies envelopes from `next_seq`
/// on; older ones are already reflected in `graph`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    pub graph: Graph,
    pub next_seq: u64,
}

impl GraphSnapshot {
    pub fn new(graph: Graph, next_seq: u64) -> Self {
        Self { graph, next_seq }
    }
}

/// A JSON-RPC notification (a request without an id).
#[derive(Debug, Serialize, Deserialize)]
pub struct Notification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl Notification {
    pub fn new(method: &str, params: impl Serialize) -> Result<Self> {
        Ok(Self {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params: serde_json::to_value(params)?,
        })
    }
}

/// A JSON-RPC request.
#[derive(Debug, Deserialize)]
pub struct Request {
    /// JSON-RPC version (always "2.0").
    pub jsonrpc: String,

    /// Request ID for matching responses. Absent for notifications.
    pub id: Option<Value>,

    pub method: String,

    #[serde(default)]
    pub params: Value,
}

/// A JSON-RPC response.
#[derive(Debug, Serialize)]
pub struct Response {
    pub jsonrpc: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Response {
    /// Creates a success response.
    pub fn success(id: Option<Value>, result: impl Serialize) -> Self {
        match serde_json::to_value(result) {
            Ok(value) => Self {
                jsonrpc: "2.0",
                id,
                result: Some(value),
                error: None,
            },
            Err(e) => Self::internal_error(id, e.to_string()),
        }
    }

    /// Creates an error response.
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Predefined error: Parse error.
    pub fn parse_error() -> Self {
        Self::error(None, -32700, "Parse error")
    }

    /// Predefined error: Method not found.
    pub fn method_not_found(id: Option<Value>, method: &str) -> Self {
        Self::error(id, -32601, format!("Method not found: {}", method))
    }

    /// Predefined error: Invalid params.
    pub fn invalid_params(id: Option<Value>, message: impl Into<String>) -> Self {
        Self::error(id, -32602, message)
    }

    /// Predefined error: Internal error.
    pub fn internal_error(id: Option<Value>, message: impl Into<String>) -> Self {
        Self::error(id, -32603, message)
    }

    /// The requester and this process disagree about which nodes exist.
    pub fn node_not_found(id: Option<Value>, message: impl Into<String>) -> Self {
        Self::error(id, NODE_NOT_FOUND, message)
    }
}

/// A JSON-RPC error.
#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Params for `graph/getNode`.
#[derive(Debug, Deserialize)]
pub struct GetNodeParams {
    pub id: String,
}
