//! DTOs for events and external surfaces.
//!
//! Events and repository rows carry trimmed records, never the rich
//! entities; the two shapes stay distinct in the type system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::{Message, MessageKind};
use super::model::Session;
use super::status::SessionStatus;
use crate::persona::PersonaRole;

/// Trimmed session record carried by events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_persona: Option<PersonaRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_solution: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            title: session.title.clone(),
            status: session.status,
            current_persona: session.current_persona,
            final_solution: session.final_solution.clone(),
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

/// Trimmed message record carried by events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: String,
    pub session_id: String,
    pub from: PersonaRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<PersonaRole>,
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl From<&Message> for MessageRecord {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.clone(),
            session_id: message.session_id.clone(),
            from: message.from,
            to: message.to,
            kind: message.kind,
            content: message.content.clone(),
            timestamp: message.timestamp,
            parent_id: message.parent_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_from_session() {
        let session = Session::new("Ship it".to_string());
        let summary = SessionSummary::from(&session);
        assert_eq!(summary.id, session.id);
        assert_eq!(summary.status, SessionStatus::Active);
        assert_eq!(summary.current_persona, Some(PersonaRole::Coordinator));
    }

    #[test]
    fn test_record_omits_internal_fields() {
        let message = Message::new("s", PersonaRole::Coordinator, MessageKind::Answer, "visible")
            .with_reasoning("private")
            .with_raw_response("[SOLUTION] visible");
        let record = MessageRecord::from(&message);
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("private"));
        assert!(!json.contains("raw"));
    }
}
