
use std::sync::Arc;
use axum::{
    extract::{State, ws::{Message, WebSocket, WebSocketUpgrade}},
    response::Response,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::{ClientEvent, RosterCountPayload, ServerEvent, Session};
use crate::state::hub::{BroadcastHub, Envelope};
use crate::state::AppState;
use crate::websocket::{
    msg_chat_handler, msg_exec_handler, msg_join_handler, msg_mute_handler, msg_ping_handler,
    msg_state_handler,
};

/// The write half of a socket, shared between the inbound loop and the
/// fan-out task.
pub type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// WebSocket handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    info!("New WebSocket connection attempt");
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

/// Handle one WebSocket connection from upgrade to teardown.
async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    // Unique connection ID identifying this client in the registry and as
    // broadcast originator
    let connection_id = Uuid::new_v4();
    info!("WebSocket connection established with connection_id: {}", connection_id);

    let (sender, mut receiver) = socket.split();
    let sender: WsSender = Arc::new(Mutex::new(sender));

    // Live fan-out starts only once the session has joined and been synced.
    let mut fanout_task: Option<JoinHandle<()>> = None;

    while let Some(Ok(Message::Text(msg))) = receiver.next().await {
        // Parse the incoming message as JSON; malformed input is logged and
        // skipped, never fatal to the connection.
        let event: ClientEvent = match serde_json::from_str(&msg) {
            Ok(event) => event,
            Err(e) => {
                error!("Failed to parse message from {}: {}", connection_id, e);
                continue;
            }
        };

        app_state.registry.touch(connection_id).await;

        match event {
            ClientEvent::Join(payload) => {
                if fanout_task.is_some() {
                    warn!("Duplicate join from {}, ignoring", connection_id);
                    continue;
                }
                let rx =
                    msg_join_handler::handle_join(&payload, connection_id, &app_state, &sender)
                        .await;
                fanout_task = Some(spawn_fanout(rx, connection_id, sender.clone()));
            }
            ClientEvent::SetMute(payload) => {
                msg_mute_handler::handle_set_mute(&payload, connection_id, &app_state).await;
            }
            ClientEvent::NotesUpdate(payload) => {
                msg_state_handler::handle_notes_update(payload, connection_id, &app_state).await;
            }
            ClientEvent::CodeUpdate(payload) => {
                msg_state_handler::handle_code_update(payload, connection_id, &app_state).await;
            }
            ClientEvent::VideoUpdate(payload) => {
                msg_state_handler::handle_video_update(payload, connection_id, &app_state).await;
            }
            ClientEvent::ExecutionOutputSync(payload) => {
                msg_state_handler::handle_output_sync(payload, connection_id, &app_state).await;
            }
            ClientEvent::ExecuteCode(payload) => {
                msg_exec_handler::handle_execute_code(payload, connection_id, app_state.clone());
            }
            ClientEvent::SendMessage(payload) => {
                msg_chat_handler::handle_send_message(&payload, connection_id, &app_state).await;
            }
            ClientEvent::Ping => {
                msg_ping_handler::handle_ping(connection_id, &sender).await;
            }
        }
    }

    if let Some(task) = fanout_task {
        task.abort();
    }

    // Implicit disconnect. A connection that never joined leaves no trace
    // and triggers no broadcasts; for a known one the notices go out under
    // the registry lock so the count cannot go stale.
    let _ = app_state
        .registry
        .leave(connection_id, |session, remaining| {
            announce_departure(&app_state.hub, session, remaining);
        })
        .await;
    info!("WebSocket connection terminated: {}", connection_id);
}

/// Departure notices, shared by socket teardown and the idle-session reaper.
pub fn announce_departure(hub: &BroadcastHub, session: &Session, remaining: usize) {
    hub.publish(
        None,
        ServerEvent::system_message(format!("{} signed off 👋", session.display_name)),
    );
    hub.publish(
        None,
        ServerEvent::RosterCount(RosterCountPayload { n: remaining }),
    );
}

/// Drain the live broadcast stream into this connection's socket, applying
/// the audience policy per envelope.
fn spawn_fanout(
    mut rx: broadcast::Receiver<Envelope>,
    connection_id: Uuid,
    sender: WsSender,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(envelope) => {
                    if !envelope.delivers_to(connection_id) {
                        continue;
                    }
                    let text = match serde_json::to_string(&envelope.event) {
                        Ok(text) => text,
                        Err(e) => {
                            error!("Failed to serialize broadcast event: {}", e);
                            continue;
                        }
                    };
                    if sender.lock().await.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Connection {} lagged, skipped {} broadcasts", connection_id, skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Send one event straight to a single socket, outside the broadcast path.
pub async fn send_direct(sender: &WsSender, event: &ServerEvent) -> bool {
    let text = match serde_json::to_string(event) {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to serialize direct event: {}", e);
            return false;
        }
    };
    sender.lock().await.send(Message::Text(text)).await.is_ok()
}
