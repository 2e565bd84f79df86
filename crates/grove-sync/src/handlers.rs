//! Pull-style requests from the mirror side.
//!
//! Used to hydrate a fresh mirror and to fetch a node the UI is about
//! to show. A miss on `graph/getNode` is reported with its own error
//! code because it means the two copies of the graph disagree.

use crate::protocol::{
    GetNodeParams, GraphSnapshot, Request, Response, METHOD_GET_GRAPH, METHOD_GET_NODE,
};
use grove_graph::{require_node, Graph};
use tracing::{debug, warn};

/// Answers one request line. `None` for notifications, which get no
/// response.
///
/// `graph` and `next_seq` must be read together (see
/// [`SyncEngine::snapshot`](crate::SyncEngine::snapshot)) so a mirror
/// hydrated from `graph/getGraph` knows exactly which delta comes next.
pub fn handle_request(line: &str, graph: &Graph, next_seq: u64) -> Option<String> {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            warn!("Failed to parse request: {}", e);
            return render(Response::parse_error());
        }
    };

    let id = request.id.clone()?;
    debug!("Request {}", request.method);

    let response = match request.method.as_str() {
        METHOD_GET_NODE => match serde_json::from_value::<GetNodeParams>(request.params) {
            Ok(params) => match require_node(graph, &params.id) {
                Ok(node) => Response::success(Some(id), node),
                Err(e) => {
                    warn!("{}", e);
                    Response::node_not_found(Some(id), e.to_string())
                }
            },
            Err(e) => Response::invalid_params(Some(id), e.to_string()),
        },
        METHOD_GET_GRAPH => {
            Response::success(Some(id), GraphSnapshot::new(graph.clone(), next_seq))
        }
        method => Response::method_not_found(Some(id), method),
    };

    render(response)
}

fn render(response: Response) -> Option<String> {
    match serde_json::to_string(&response) {
        Ok(line) => Some(line),
        Err(e) => {
            warn!("Failed to serialize response: {}", e);
            None
        }
    }
}
