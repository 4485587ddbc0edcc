//! WebSocket connection lifecycle and inbound message dispatch.

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::{ClientMessage, ServerMessage},
    error::ServiceError,
    services::{events, room_service},
    state::{ClientConnection, SharedState, room::ConnectionId},
};

/// Handle the full lifecycle for one game client WebSocket connection.
///
/// A dedicated writer task drains the outbound channel so broadcasts keep
/// flowing even while this task awaits inbound frames. Disconnecting is an
/// implicit leave: whatever room the connection was in is cleaned up before
/// the socket is forgotten.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let connection_id: ConnectionId = Uuid::new_v4();
    state.clients().insert(
        connection_id,
        ClientConnection {
            id: connection_id,
            tx: outbound_tx.clone(),
        },
    );
    info!(%connection_id, "client connected");

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match ClientMessage::from_json_str(&text) {
                Ok(ClientMessage::Unknown) => {
                    warn!(%connection_id, "ignoring unknown client event");
                }
                Ok(inbound) => {
                    if let Err(err) = dispatch(&state, connection_id, inbound).await {
                        report_failure(&state, connection_id, err);
                    }
                }
                Err(err) => {
                    warn!(%connection_id, error = %err, "failed to parse client message");
                    events::send_to_connection(
                        &state,
                        connection_id,
                        &ServerMessage::Error {
                            message: err.to_string(),
                        },
                    );
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(%connection_id, "client closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(%connection_id, error = %err, "websocket error");
                break;
            }
        }
    }

    // Implicit leave before the socket is forgotten.
    room_service::leave_room(&state, connection_id).await;
    state.clients().remove(&connection_id);
    info!(%connection_id, "client disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Route one parsed client message to its coordinator handler.
async fn dispatch(
    state: &SharedState,
    connection_id: ConnectionId,
    message: ClientMessage,
) -> Result<(), ServiceError> {
    match message {
        ClientMessage::CreateRoom {
            display_name,
            durable_user_id,
            settings,
            desired_code,
        } => {
            room_service::create_room(
                state,
                connection_id,
                display_name,
                durable_user_id,
                settings,
                desired_code,
            )
            .await
        }
        ClientMessage::JoinRoom {
            code,
            display_name,
            durable_user_id,
        } => room_service::join_room(state, connection_id, &code, display_name, durable_user_id).await,
        ClientMessage::RejoinRoom { code, display_name } => {
            room_service::rejoin_room(state, connection_id, &code, &display_name).await
        }
        ClientMessage::UpdateSettings { code, settings } => {
            room_service::update_settings(state, connection_id, &code, settings).await
        }
        ClientMessage::StartGame { code } => {
            room_service::start_game(state, connection_id, &code).await
        }
        ClientMessage::RequestRound { code, round_index } => {
            room_service::request_round(state, connection_id, &code, round_index).await
        }
        ClientMessage::SubmitAnswer {
            code,
            round_index,
            answer,
            time_remaining,
        } => {
            room_service::submit_answer(
                state,
                connection_id,
                &code,
                round_index,
                answer,
                time_remaining,
            )
            .await
        }
        ClientMessage::LeaveRoom {} => {
            room_service::leave_room(state, connection_id).await;
            Ok(())
        }
        ClientMessage::Unknown => Ok(()),
    }
}

/// Report a failed request back to the initiating connection only.
fn report_failure(state: &SharedState, connection_id: ConnectionId, err: ServiceError) {
    warn!(%connection_id, error = %err, "request failed");
    events::send_to_connection(
        state,
        connection_id,
        &ServerMessage::Error {
            message: err.to_string(),
        },
    );
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
