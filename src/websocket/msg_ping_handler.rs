use tracing::debug;
use uuid::Uuid;
use chrono::Utc;

use crate::models::{PongPayload, ServerEvent};
use crate::websocket::handler::{send_direct, WsSender};

/// Handle a heartbeat ping with a direct pong; the last-seen refresh happens
/// in the inbound loop before dispatch.
pub async fn handle_ping(connection_id: Uuid, sender: &WsSender) {
    debug!("Ping received from {}", connection_id);
    let pong = ServerEvent::Pong(PongPayload {
        date: Utc::now().to_rfc3339(),
    });
    send_direct(sender, &pong).await;
}
