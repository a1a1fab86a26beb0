use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::{
    CodeState, ExecutionOutput, StateSnapshot, VideoState, VideoUpdatePayload,
};

/// Owner of every shared singleton the session collaborates on.
///
/// Each field sits behind its own lock so one slow writer never blocks an
/// unrelated field, while writes to a single field still form a total order
/// (last write wins, no merging).
pub struct SharedStateStore {
    video: RwLock<VideoState>,
    notes: RwLock<String>,
    code: RwLock<CodeState>,
}

impl SharedStateStore {
    pub fn new() -> Self {
        Self {
            video: RwLock::new(VideoState::default()),
            notes: RwLock::new(String::new()),
            code: RwLock::new(CodeState::default()),
        }
    }

    /// Whole-document replace; there is no merge.
    pub async fn update_notes(&self, text: String) {
        *self.notes.write().await = text;
    }

    pub async fn update_code(&self, text: String) {
        self.code.write().await.code = text;
    }

    /// Merge a partial update into the video state and return the full merged
    /// value for fan-out.
    pub async fn update_video(&self, patch: VideoUpdatePayload) -> VideoState {
        let mut video = self.video.write().await;
        if let Some(url) = patch.url {
            video.url = url;
        }
        if let Some(video_id) = patch.video_id {
            video.video_id = video_id;
        }
        if let Some(is_playing) = patch.is_playing {
            video.is_playing = is_playing;
        }
        if let Some(current_time) = patch.current_time {
            video.current_time = current_time;
        }
        video.last_update = Utc::now().timestamp_millis();
        video.clone()
    }

    pub async fn record_execution_result(&self, output: ExecutionOutput) {
        self.code.write().await.last_output = Some(output);
    }

    /// Client-computed output passthrough; overwrites the last result.
    pub async fn record_output_sync(&self, output: String) {
        self.code.write().await.last_output = Some(ExecutionOutput {
            output,
            is_error: false,
            elapsed_ms: 0,
        });
    }

    pub async fn code_language(&self) -> String {
        self.code.read().await.language.clone()
    }

    /// Immutable copy of every field for a joining session. Each field is
    /// read atomically under its own lock; the snapshot never exposes a
    /// half-applied write.
    pub async fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            video: self.video.read().await.clone(),
            notes: self.notes.read().await.clone(),
            code: self.code.read().await.clone(),
        }
    }
}
