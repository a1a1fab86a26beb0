use std::collections::HashMap;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Session, VoiceStatus};

/// Session table for all live connections, keyed by connection id.
///
/// Entries are created by `join` and removed only by `leave` or the idle
/// reaper; there is no passive expiry. Callers must guarantee one `join` per
/// connection, since joining the same id twice creates duplicate bookkeeping.
///
/// Join, leave and reap take an `announce` callback that runs while the
/// table lock is still held, so a published roster count always equals the
/// table size at the instant of the mutation and announcements from
/// concurrent mutations cannot reorder. Callbacks must be synchronous and
/// cheap; hub publishes are both.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new session. `announce` sees the registry size including
    /// it; that size is also returned.
    pub async fn join(
        &self,
        id: Uuid,
        display_name: String,
        announce: impl FnOnce(usize),
    ) -> usize {
        let mut sessions = self.sessions.write().await;
        sessions.insert(id, Session::new(id, display_name));
        let count = sessions.len();
        announce(count);
        count
    }

    /// Remove a session. Unknown ids are a silent no-op: `announce` never
    /// runs and `None` is returned, so nothing is emitted for them.
    pub async fn leave(
        &self,
        id: Uuid,
        announce: impl FnOnce(&Session, usize),
    ) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.remove(&id)?;
        announce(&session, sessions.len());
        Some(session)
    }

    /// Flip a session's mute flag. Returns the new voice status, or `None`
    /// for an unknown session (no-op, nothing to broadcast).
    pub async fn set_mute(&self, id: Uuid, is_unmuted: bool) -> Option<VoiceStatus> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id)?;
        session.muted = !is_unmuted;
        Some(session.voice_status())
    }

    pub async fn display_name(&self, id: Uuid) -> Option<String> {
        self.sessions
            .read()
            .await
            .get(&id)
            .map(|s| s.display_name.clone())
    }

    /// Refresh a session's last-seen time. Unknown ids are ignored.
    pub async fn touch(&self, id: Uuid) {
        if let Some(session) = self.sessions.write().await.get_mut(&id) {
            session.last_seen = Utc::now();
        }
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Remove every session idle for longer than `idle_secs`. `announce`
    /// runs once per removal, still under the lock, with the size right
    /// after that removal; the reaped sessions are returned for logging.
    pub async fn reap_idle(
        &self,
        idle_secs: i64,
        mut announce: impl FnMut(&Session, usize),
    ) -> Vec<Session> {
        let cutoff = Utc::now() - Duration::seconds(idle_secs);
        let mut sessions = self.sessions.write().await;
        let expired: Vec<Uuid> = sessions
            .values()
            .filter(|s| s.last_seen < cutoff)
            .map(|s| s.id)
            .collect();

        let mut reaped = Vec::with_capacity(expired.len());
        for id in expired {
            if let Some(session) = sessions.remove(&id) {
                debug!("Reaping idle session {} ({})", session.display_name, id);
                announce(&session, sessions.len());
                reaped.push(session);
            }
        }
        reaped
    }
}
