//! Outbound event delivery to client sockets.
//!
//! Every gameplay event funnels through here so room locks are never held
//! while a frame is queued: callers collect target connection ids under the
//! lock, drop it, then send.

use axum::extract::ws::Message;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{
    dto::ws::ServerMessage,
    state::{SharedState, room::ConnectionId},
};

/// Send one event to a single connection, dropping it silently when the
/// socket has already gone away.
pub fn send_to_connection(
    state: &SharedState,
    connection_id: ConnectionId,
    message: &ServerMessage,
) {
    let Some(tx) = state
        .clients()
        .get(&connection_id)
        .map(|client| client.tx.clone())
    else {
        debug!(%connection_id, "no live socket for connection; dropping event");
        return;
    };

    if send_json(&tx, message).is_err() {
        // Writer task is gone; the socket handler will clean up membership.
        warn!(%connection_id, "writer closed, removing client connection");
        state.clients().remove(&connection_id);
    }
}

/// Send one event to every listed connection.
pub fn broadcast(state: &SharedState, targets: &[ConnectionId], message: &ServerMessage) {
    for &connection_id in targets {
        send_to_connection(state, connection_id, message);
    }
}

/// Serialize a payload and push it onto a socket's writer channel.
fn send_json(tx: &mpsc::UnboundedSender<Message>, message: &ServerMessage) -> Result<(), ()> {
    let payload = match serde_json::to_string(message) {
        Ok(payload) => payload,
        Err(err) => {
            // Serialization failure is permanent; retrying cannot help.
            warn!(error = %err, "failed to serialize server message `{message:?}`");
            return Ok(());
        }
    };

    tx.send(Message::Text(payload.into())).map_err(|_| ())
}
