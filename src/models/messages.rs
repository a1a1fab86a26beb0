
use serde::{Deserialize, Serialize};
use crate::models::{ChatMessage, ExecutionOutput, VideoState, VoiceStatus};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct JoinPayload {
    pub display_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SetMutePayload {
    pub is_unmuted: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TextPayload {
    pub text: String,
}

/// Partial video update; absent fields keep their current value.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct VideoUpdatePayload {
    pub url: Option<String>,
    pub video_id: Option<String>,
    pub is_playing: Option<bool>,
    pub current_time: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OutputSyncPayload {
    pub output: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ExecutePayload {
    pub code: String,
}

/// Everything a participant can send over the WebSocket. Disconnect has no
/// message; it is the socket closing.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "join")]
    Join(JoinPayload),
    #[serde(rename = "set-mute")]
    SetMute(SetMutePayload),
    #[serde(rename = "notes-update")]
    NotesUpdate(TextPayload),
    #[serde(rename = "code-update")]
    CodeUpdate(TextPayload),
    #[serde(rename = "video-update")]
    VideoUpdate(VideoUpdatePayload),
    #[serde(rename = "execution-output-sync")]
    ExecutionOutputSync(OutputSyncPayload),
    #[serde(rename = "execute-code")]
    ExecuteCode(ExecutePayload),
    #[serde(rename = "send-message")]
    SendMessage(TextPayload),
    #[serde(rename = "ping")]
    Ping,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SystemMessagePayload {
    pub text: String,
    /// Unix milliseconds.
    pub timestamp: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RosterCountPayload {
    pub n: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PongPayload {
    pub date: String,
}

/// Everything the hub can send to a participant.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "system-message")]
    SystemMessage(SystemMessagePayload),
    #[serde(rename = "video-sync")]
    VideoSync(VideoState),
    #[serde(rename = "notes-sync")]
    NotesSync(TextPayload),
    #[serde(rename = "code-sync")]
    CodeSync(TextPayload),
    #[serde(rename = "code-output-update")]
    CodeOutputUpdate(OutputSyncPayload),
    #[serde(rename = "roster-count")]
    RosterCount(RosterCountPayload),
    #[serde(rename = "mute-status")]
    MuteStatus(VoiceStatus),
    #[serde(rename = "execution-result")]
    ExecutionResult(ExecutionOutput),
    #[serde(rename = "chat-message")]
    ChatMessage(ChatMessage),
    #[serde(rename = "pong")]
    Pong(PongPayload),
}

impl ServerEvent {
    pub fn system_message(text: String) -> Self {
        ServerEvent::SystemMessage(SystemMessagePayload {
            text,
            timestamp: chrono::Utc::now().timestamp_millis(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_events_deserialize_from_tagged_json() {
        let join: ClientEvent =
            serde_json::from_str(r#"{"type":"join","displayName":"Alice"}"#).unwrap();
        match join {
            ClientEvent::Join(p) => assert_eq!(p.display_name, "Alice"),
            other => panic!("unexpected event: {:?}", other),
        }

        let mute: ClientEvent =
            serde_json::from_str(r#"{"type":"set-mute","isUnmuted":true}"#).unwrap();
        assert!(matches!(mute, ClientEvent::SetMute(p) if p.is_unmuted));

        let ping: ClientEvent = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(ping, ClientEvent::Ping));
    }

    #[test]
    fn partial_video_update_leaves_absent_fields_none() {
        let ev: ClientEvent =
            serde_json::from_str(r#"{"type":"video-update","currentTime":42.5}"#).unwrap();
        let ClientEvent::VideoUpdate(p) = ev else {
            panic!("expected video-update");
        };
        assert_eq!(p.current_time, Some(42.5));
        assert!(p.url.is_none() && p.video_id.is_none() && p.is_playing.is_none());
    }

    #[test]
    fn outbound_events_carry_their_wire_tag() {
        let json =
            serde_json::to_string(&ServerEvent::RosterCount(RosterCountPayload { n: 3 })).unwrap();
        assert!(json.contains(r#""type":"roster-count""#));
        assert!(json.contains(r#""n":3"#));

        let json = serde_json::to_string(&ServerEvent::system_message("hi".into())).unwrap();
        assert!(json.contains(r#""type":"system-message""#));
    }

    #[test]
    fn malformed_payload_is_a_parse_error_not_a_panic() {
        let res: Result<ClientEvent, _> =
            serde_json::from_str(r#"{"type":"set-mute","isUnmuted":"loud"}"#);
        assert!(res.is_err());
    }
}
