use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::models::ServerEvent;

/// Capacity of the broadcast channel. A receiver that falls this far behind
/// skips messages (RecvError::Lagged) rather than applying backpressure.
const BROADCAST_CAPACITY: usize = 512;

/// Who an outbound event is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Everyone,
    ExceptOrigin,
}

/// One event travelling through the hub, stamped with the session that
/// caused it so per-connection send tasks can apply the audience policy.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub origin: Option<Uuid>,
    pub event: ServerEvent,
}

impl Envelope {
    /// Whether the send task for `session_id` should deliver this envelope.
    pub fn delivers_to(&self, session_id: Uuid) -> bool {
        match self.event.audience() {
            Audience::Everyone => true,
            Audience::ExceptOrigin => self.origin != Some(session_id),
        }
    }
}

impl ServerEvent {
    /// The fixed event-to-audience mapping. The policy lives here as data on
    /// the event kind, never as a per-call-site decision.
    pub fn audience(&self) -> Audience {
        match self {
            ServerEvent::SystemMessage(_) => Audience::Everyone,
            ServerEvent::RosterCount(_) => Audience::Everyone,
            ServerEvent::ChatMessage(_) => Audience::Everyone,
            // Execution results are a shared artifact, not a personal echo:
            // the requester gets its own result back too.
            ServerEvent::ExecutionResult(_) => Audience::Everyone,
            ServerEvent::NotesSync(_) => Audience::ExceptOrigin,
            ServerEvent::CodeSync(_) => Audience::ExceptOrigin,
            ServerEvent::VideoSync(_) => Audience::ExceptOrigin,
            ServerEvent::CodeOutputUpdate(_) => Audience::ExceptOrigin,
            ServerEvent::MuteStatus(_) => Audience::ExceptOrigin,
            // Pong is a direct reply and never enters the hub; the mapping is
            // kept total so a misrouted one is merely harmless.
            ServerEvent::Pong(_) => Audience::Everyone,
        }
    }
}

/// Fan-out channel shared by all connections. Cloneable; lives in AppState.
#[derive(Clone)]
pub struct BroadcastHub {
    tx: broadcast::Sender<Envelope>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(BROADCAST_CAPACITY);
        Self { tx }
    }

    /// Subscribe to the live stream. A joining connection must subscribe
    /// before its snapshot is captured so no update can slip between the two.
    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.tx.subscribe()
    }

    /// Publish an event to every subscriber. `origin` is the session whose
    /// action produced the event, if any; except-origin events are filtered
    /// against it at each receiver.
    pub fn publish(&self, origin: Option<Uuid>, event: ServerEvent) {
        // send() errs only when nobody is subscribed, which is fine.
        if let Err(e) = self.tx.send(Envelope { origin, event }) {
            debug!("Dropped broadcast, no receivers: {}", e);
        }
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
