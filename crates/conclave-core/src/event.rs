//! Session events and the broadcaster contract.
//!
//! Subscribers observe a session's progress through these events. Delivery
//! is best-effort: a slow or failing transport must never block or fail the
//! dispatch loop, so the contract is fire-and-forget and implementations
//! swallow their own errors. Persisted messages remain the authoritative
//! record.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::session::{MessageRecord, SessionSummary};

/// Typed event fan-out for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// One per appended message.
    MessageReceived { message: MessageRecord },
    /// On every status change.
    SessionStatusChanged { session: SessionSummary },
    /// In addition to MessageReceived when a persona asks the user.
    ClarificationRequested { message: MessageRecord },
    /// Once, on transition to Completed.
    SolutionReady { session: SessionSummary },
    /// Once, on transition to Stuck, with best-effort partial results.
    SessionStuck {
        session: SessionSummary,
        partial_results: String,
    },
}

impl SessionEvent {
    /// Stable event name, for logging and transports that key on strings.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::MessageReceived { .. } => "message_received",
            SessionEvent::SessionStatusChanged { .. } => "session_status_changed",
            SessionEvent::ClarificationRequested { .. } => "clarification_requested",
            SessionEvent::SolutionReady { .. } => "solution_ready",
            SessionEvent::SessionStuck { .. } => "session_stuck",
        }
    }
}

/// Fan-out contract consumed by the orchestrator.
///
/// Implementations deliver to whatever transport they like (broadcast
/// channels, websockets, a recording stub in tests). They must not fail:
/// delivery problems are logged and dropped on the implementation side.
#[async_trait]
pub trait EventBroadcaster: Send + Sync {
    async fn broadcast(&self, session_id: &str, event: SessionEvent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let session = Session::new("problem".to_string());
        let event = SessionEvent::SessionStatusChanged {
            session: SessionSummary::from(&session),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"session_status_changed""#));
    }

    #[test]
    fn test_event_names() {
        let session = Session::new("problem".to_string());
        let summary = SessionSummary::from(&session);
        let event = SessionEvent::SessionStuck {
            session: summary,
            partial_results: "trail".to_string(),
        };
        assert_eq!(event.name(), "session_stuck");
    }
}
