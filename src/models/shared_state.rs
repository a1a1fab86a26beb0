use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Current playback state of the shared video player.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoState {
    pub url: String,
    pub video_id: String,
    pub is_playing: bool,
    pub current_time: f64,
    /// Unix milliseconds of the last accepted update.
    pub last_update: i64,
}

impl Default for VideoState {
    fn default() -> Self {
        Self {
            url: String::new(),
            video_id: String::new(),
            is_playing: false,
            current_time: 0.0,
            last_update: Utc::now().timestamp_millis(),
        }
    }
}

/// Result of one code execution, shared with every participant.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutput {
    pub output: String,
    pub is_error: bool,
    pub elapsed_ms: u64,
}

/// The collaboratively edited code buffer plus its last execution result.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CodeState {
    pub code: String,
    pub language: String,
    pub last_output: Option<ExecutionOutput>,
}

impl Default for CodeState {
    fn default() -> Self {
        Self {
            code: String::new(),
            language: "python".to_string(),
            last_output: None,
        }
    }
}

/// Immutable copy of every shared field, captured for a joining session.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub video: VideoState,
    pub notes: String,
    pub code: CodeState,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    System,
}

/// One chat log entry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub sender: String,
    pub text: String,
    /// Unix milliseconds.
    pub timestamp: i64,
    pub kind: MessageKind,
}

impl ChatMessage {
    pub fn user(sender: String, text: String) -> Self {
        Self {
            sender,
            text,
            timestamp: Utc::now().timestamp_millis(),
            kind: MessageKind::User,
        }
    }
}
