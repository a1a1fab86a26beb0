use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

use crate::models::{JoinPayload, RosterCountPayload, ServerEvent, TextPayload};
use crate::state::hub::{BroadcastHub, Envelope};
use crate::state::AppState;
use crate::websocket::handler::{send_direct, WsSender};

/// Bring a newly joined session to a consistent view, then hand back the
/// live receiver its fan-out task will drain.
///
/// The receiver is created before the session is registered, so nothing can
/// be lost between registration and attachment; an update racing the
/// snapshot is delivered again as a full-value sync, which last-write-wins
/// makes idempotent. The join notice and roster count are published inside
/// the registry's lock, so the count always matches the registry and two
/// concurrent joins cannot announce out of order. Delivery to the new
/// socket follows the fixed sequence assembled by `sync_sequence`; the
/// buffered join notice and roster count drain only after it.
pub async fn handle_join(
    payload: &JoinPayload,
    connection_id: Uuid,
    app_state: &Arc<AppState>,
    sender: &WsSender,
) -> broadcast::Receiver<Envelope> {
    info!("Join received: {} as '{}'", connection_id, payload.display_name);

    let rx = app_state.hub.subscribe();

    app_state
        .registry
        .join(connection_id, payload.display_name.clone(), |count| {
            announce_join(&app_state.hub, connection_id, &payload.display_name, count);
        })
        .await;

    for event in sync_sequence(app_state).await {
        send_direct(sender, &event).await;
    }

    rx
}

/// Join notices, published while the registry lock is held.
fn announce_join(hub: &BroadcastHub, connection_id: Uuid, display_name: &str, count: usize) {
    hub.publish(
        Some(connection_id),
        ServerEvent::system_message(format!("{} joined the study session! 🧑‍💻", display_name)),
    );
    hub.publish(
        Some(connection_id),
        ServerEvent::RosterCount(RosterCountPayload { n: count }),
    );
}

/// The fixed-order state sync for a joining session: video, notes, code
/// text (the last execution output is not part of the initial sync), then
/// the full chat history in append order.
async fn sync_sequence(app_state: &AppState) -> Vec<ServerEvent> {
    let snapshot = app_state.store.snapshot().await;
    let mut events = vec![
        ServerEvent::VideoSync(snapshot.video),
        ServerEvent::NotesSync(TextPayload { text: snapshot.notes }),
        ServerEvent::CodeSync(TextPayload { text: snapshot.code.code }),
    ];
    events.extend(
        app_state
            .history
            .replay()
            .await
            .into_iter()
            .map(ServerEvent::ChatMessage),
    );
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{ChatMessage, ExecutionOutput, VideoUpdatePayload};

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(&Config::default()))
    }

    #[tokio::test]
    async fn sync_sequence_is_video_then_notes_then_code_then_replay() {
        let app_state = state();
        app_state
            .store
            .update_video(VideoUpdatePayload {
                url: Some("https://youtu.be/x".into()),
                video_id: Some("x".into()),
                is_playing: Some(true),
                current_time: Some(12.0),
            })
            .await;
        app_state.store.update_notes("shared notes".into()).await;
        app_state.store.update_code("print(42)".into()).await;
        app_state
            .history
            .append(ChatMessage::user("Alice".into(), "hello".into()))
            .await;
        app_state
            .history
            .append(ChatMessage::user("Bob".into(), "hi Alice".into()))
            .await;

        let events = sync_sequence(&app_state).await;
        assert_eq!(events.len(), 5);
        assert!(matches!(&events[0], ServerEvent::VideoSync(v) if v.video_id == "x"));
        assert!(matches!(&events[1], ServerEvent::NotesSync(p) if p.text == "shared notes"));
        assert!(matches!(&events[2], ServerEvent::CodeSync(p) if p.text == "print(42)"));
        assert!(matches!(&events[3], ServerEvent::ChatMessage(m) if m.text == "hello"));
        assert!(matches!(&events[4], ServerEvent::ChatMessage(m) if m.text == "hi Alice"));
    }

    #[tokio::test]
    async fn sync_sequence_carries_code_text_but_never_the_last_output() {
        let app_state = state();
        app_state.store.update_code("print(42)".into()).await;
        app_state
            .store
            .record_execution_result(ExecutionOutput {
                output: "42\n".into(),
                is_error: false,
                elapsed_ms: 5,
            })
            .await;

        let events = sync_sequence(&app_state).await;
        assert!(matches!(&events[2], ServerEvent::CodeSync(p) if p.text == "print(42)"));
        assert!(!events.iter().any(|e| matches!(
            e,
            ServerEvent::ExecutionResult(_) | ServerEvent::CodeOutputUpdate(_)
        )));
    }

    #[tokio::test]
    async fn chat_sent_before_a_join_replays_ahead_of_any_live_chat() {
        let app_state = state();
        app_state
            .history
            .append(ChatMessage::user("Alice".into(), "hello".into()))
            .await;

        // A joiner's receiver attaches before its replay is assembled.
        let mut rx = app_state.hub.subscribe();
        let events = sync_sequence(&app_state).await;

        // Live chat arrives only afterwards, through the receiver.
        app_state.hub.publish(
            None,
            ServerEvent::ChatMessage(ChatMessage::user("Alice".into(), "welcome!".into())),
        );

        let replayed: Vec<&ServerEvent> = events
            .iter()
            .filter(|e| matches!(e, ServerEvent::ChatMessage(_)))
            .collect();
        assert_eq!(replayed.len(), 1);
        assert!(matches!(replayed[0], ServerEvent::ChatMessage(m) if m.text == "hello"));

        let live = rx.recv().await.unwrap();
        assert!(matches!(live.event, ServerEvent::ChatMessage(m) if m.text == "welcome!"));
    }

    #[tokio::test]
    async fn join_announces_notice_then_roster_count_matching_registry_size() {
        let app_state = state();
        let mut rx = app_state.hub.subscribe();

        let a = Uuid::new_v4();
        app_state
            .registry
            .join(a, "Alice".into(), |count| {
                announce_join(&app_state.hub, a, "Alice", count);
            })
            .await;
        let b = Uuid::new_v4();
        app_state
            .registry
            .join(b, "Bob".into(), |count| {
                announce_join(&app_state.hub, b, "Bob", count);
            })
            .await;

        let first = rx.recv().await.unwrap();
        assert!(matches!(&first.event, ServerEvent::SystemMessage(m) if m.text.contains("Alice")));
        let second = rx.recv().await.unwrap();
        assert!(matches!(second.event, ServerEvent::RosterCount(RosterCountPayload { n: 1 })));
        let third = rx.recv().await.unwrap();
        assert!(matches!(&third.event, ServerEvent::SystemMessage(m) if m.text.contains("Bob")));
        let fourth = rx.recv().await.unwrap();
        assert!(matches!(fourth.event, ServerEvent::RosterCount(RosterCountPayload { n: 2 })));
        assert_eq!(app_state.registry.count().await, 2);
    }
}
