//! WebSocket upgrade handler for live post notifications.
//!
//! Handles the HTTP → WebSocket upgrade and hands the connection to a
//! [`ClientSession`]:
//! 1. Upgrade to WebSocket with the inbound frame limit applied
//! 2. Split the socket into its write and read halves
//! 3. Start the session, which registers with the hub
//!
//! Everything after adoption (delivery, probes, teardown) belongs to the
//! session's loops.

use axum::{
    extract::{ws::WebSocket, State, WebSocketUpgrade},
    response::Response,
    routing::get,
    Router,
};
use tracing::debug;

use super::axum_connection::split_socket;
use super::hub::Hub;
use super::session::ClientSession;

/// Handle WebSocket upgrade requests.
///
/// Route: `GET {ws_path}` (default `/ws`)
///
/// No authentication and no subprotocol negotiation; any peer completing the
/// handshake becomes a live client.
pub async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<Hub>) -> Response {
    let max_frame = hub.session_limits().max_inbound_frame_bytes;

    ws.max_message_size(max_frame)
        .max_frame_size(max_frame)
        .on_upgrade(move |socket| adopt(socket, hub))
}

/// Adopts an upgraded connection as a live client.
async fn adopt(socket: WebSocket, hub: Hub) {
    let (sink, source) = split_socket(socket);
    let session = ClientSession::new(
        Box::new(sink),
        Box::new(source),
        hub.session_limits().clone(),
    );
    debug!(client_id = %session.id(), "WebSocket connection adopted");

    session.start(&hub);
}

/// Create axum router for the WebSocket endpoint.
///
/// # Example
///
/// ```ignore
/// let app = Router::new()
///     .merge(websocket_router("/ws"))
///     .with_state(hub);
/// ```
pub fn websocket_router(path: &str) -> Router<Hub> {
    Router::new().route(path, get(ws_handler))
}
