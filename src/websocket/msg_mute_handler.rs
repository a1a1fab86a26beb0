use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::models::{ServerEvent, SetMutePayload};
use crate::state::AppState;

/// Handle a mute toggle. Unknown sessions are a silent no-op.
pub async fn handle_set_mute(
    payload: &SetMutePayload,
    connection_id: Uuid,
    app_state: &Arc<AppState>,
) {
    let Some(status) = app_state
        .registry
        .set_mute(connection_id, payload.is_unmuted)
        .await
    else {
        debug!("Mute toggle from unknown session {}, ignoring", connection_id);
        return;
    };

    let notice = format!(
        "{} is now {}",
        status.display_name,
        if payload.is_unmuted { "Unmuted 🎙️" } else { "Muted 🔇" }
    );

    app_state
        .hub
        .publish(Some(connection_id), ServerEvent::MuteStatus(status));
    app_state
        .hub
        .publish(Some(connection_id), ServerEvent::system_message(notice));
}
