use std::sync::Arc;
use uuid::Uuid;

use crate::models::{OutputSyncPayload, ServerEvent, TextPayload, VideoUpdatePayload};
use crate::state::AppState;

/// Overwrite the shared notes document and fan the new text out.
pub async fn handle_notes_update(
    payload: TextPayload,
    connection_id: Uuid,
    app_state: &Arc<AppState>,
) {
    app_state.store.update_notes(payload.text.clone()).await;
    app_state
        .hub
        .publish(Some(connection_id), ServerEvent::NotesSync(payload));
}

/// Overwrite the shared code buffer and fan the new text out.
pub async fn handle_code_update(
    payload: TextPayload,
    connection_id: Uuid,
    app_state: &Arc<AppState>,
) {
    app_state.store.update_code(payload.text.clone()).await;
    app_state
        .hub
        .publish(Some(connection_id), ServerEvent::CodeSync(payload));
}

/// Merge a partial video update and fan out the full merged state so late
/// receivers never need to reconstruct it from deltas.
pub async fn handle_video_update(
    payload: VideoUpdatePayload,
    connection_id: Uuid,
    app_state: &Arc<AppState>,
) {
    let merged = app_state.store.update_video(payload).await;
    app_state
        .hub
        .publish(Some(connection_id), ServerEvent::VideoSync(merged));
}

/// Client-computed execution output passthrough, distinct from the
/// gateway-backed execute path.
pub async fn handle_output_sync(
    payload: OutputSyncPayload,
    connection_id: Uuid,
    app_state: &Arc<AppState>,
) {
    app_state.store.record_output_sync(payload.output.clone()).await;
    app_state
        .hub
        .publish(Some(connection_id), ServerEvent::CodeOutputUpdate(payload));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(&Config::default()))
    }

    #[tokio::test]
    async fn notes_update_stores_and_fans_out_except_origin() {
        let app_state = state();
        let origin = Uuid::new_v4();
        let mut rx = app_state.hub.subscribe();

        handle_notes_update(TextPayload { text: "shared notes".into() }, origin, &app_state).await;

        assert_eq!(app_state.store.snapshot().await.notes, "shared notes");
        let envelope = rx.recv().await.unwrap();
        assert!(matches!(&envelope.event, ServerEvent::NotesSync(p) if p.text == "shared notes"));
        assert!(!envelope.delivers_to(origin));
        assert!(envelope.delivers_to(Uuid::new_v4()));
    }

    #[tokio::test]
    async fn video_update_fans_out_the_full_merged_state() {
        let app_state = state();
        let origin = Uuid::new_v4();
        handle_video_update(
            VideoUpdatePayload {
                url: Some("https://youtu.be/x".into()),
                video_id: Some("x".into()),
                is_playing: Some(true),
                current_time: Some(5.0),
            },
            origin,
            &app_state,
        )
        .await;

        let mut rx = app_state.hub.subscribe();
        handle_video_update(
            VideoUpdatePayload {
                current_time: Some(9.0),
                ..Default::default()
            },
            origin,
            &app_state,
        )
        .await;

        let envelope = rx.recv().await.unwrap();
        let ServerEvent::VideoSync(video) = envelope.event else {
            panic!("expected video-sync");
        };
        assert_eq!(video.video_id, "x");
        assert!(video.is_playing);
        assert_eq!(video.current_time, 9.0);
    }

    #[tokio::test]
    async fn output_sync_overwrites_last_output_and_fans_out() {
        let app_state = state();
        let origin = Uuid::new_v4();
        let mut rx = app_state.hub.subscribe();

        handle_output_sync(OutputSyncPayload { output: "hi\n".into() }, origin, &app_state).await;

        let last = app_state.store.snapshot().await.code.last_output.unwrap();
        assert_eq!(last.output, "hi\n");
        assert!(!last.is_error);

        let envelope = rx.recv().await.unwrap();
        assert!(matches!(&envelope.event, ServerEvent::CodeOutputUpdate(p) if p.output == "hi\n"));
        assert!(!envelope.delivers_to(origin));
    }
}
