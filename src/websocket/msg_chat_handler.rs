use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::models::{ChatMessage, ServerEvent, TextPayload};
use crate::state::AppState;

/// Append a chat message to the history and fan it out to everyone. A
/// connection that never joined has no display name and is ignored.
pub async fn handle_send_message(
    payload: &TextPayload,
    connection_id: Uuid,
    app_state: &Arc<AppState>,
) {
    let Some(sender_name) = app_state.registry.display_name(connection_id).await else {
        debug!("Chat from unjoined connection {}, ignoring", connection_id);
        return;
    };

    let message = ChatMessage::user(sender_name, payload.text.clone());
    app_state.history.append(message.clone()).await;
    app_state
        .hub
        .publish(Some(connection_id), ServerEvent::ChatMessage(message));
}
