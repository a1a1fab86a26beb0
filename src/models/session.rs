use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One active participant connection.
///
/// The mute flag lives here and nowhere else; the `VoiceStatus` sent over the
/// wire is derived from it on demand, so registry and voice state cannot
/// drift apart.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub display_name: String,
    pub muted: bool,
    pub joined_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl Session {
    pub fn new(id: Uuid, display_name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            display_name,
            // Everyone starts muted, as in any well-run study session.
            muted: true,
            joined_at: now,
            last_seen: now,
        }
    }

    pub fn voice_status(&self) -> VoiceStatus {
        VoiceStatus {
            display_name: self.display_name.clone(),
            is_muted: self.muted,
        }
    }
}

/// Wire shape of a participant's voice state.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoiceStatus {
    pub display_name: String,
    pub is_muted: bool,
}
