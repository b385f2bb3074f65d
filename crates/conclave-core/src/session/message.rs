//! Conversation message types.
//!
//! Messages are append-only: the orchestrator creates them, repositories
//! store them, and nothing mutates them afterwards. Total order within a
//! session is by timestamp, with insertion order breaking ties.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persona::PersonaRole;

/// What a message represents within the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// The user's original problem, appended once at session start.
    ProblemStatement,
    /// A question between personas.
    Question,
    /// A plain persona response carrying no directive.
    Answer,
    /// A hand-off to another persona.
    Delegation,
    /// A question directed at the user; pauses the session.
    Clarification,
    /// The user's reply to a clarification.
    UserResponse,
    /// A result: intermediate from a specialist, final from the Coordinator.
    Solution,
    /// A persona declaring it cannot make progress.
    Stuck,
    /// A persona declining delegated work.
    Decline,
}

/// An append-only entry in a session's conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier (UUID format).
    pub id: String,
    /// The session this message belongs to.
    pub session_id: String,
    /// Who produced the message.
    pub from: PersonaRole,
    /// Who the message is directed at, when anyone in particular.
    pub to: Option<PersonaRole>,
    /// Visible content (tag directives stripped).
    pub content: String,
    /// What the message represents.
    pub kind: MessageKind,
    /// Internal reasoning extracted from `[REASONING]` blocks, plus any
    /// notes the orchestrator attached (e.g. a demoted delegation).
    pub reasoning: Option<String>,
    /// Creation timestamp.
    pub timestamp: DateTime<Utc>,
    /// The message this one responds to.
    pub parent_id: Option<String>,
    /// For delegations: the persona receiving the work.
    pub delegate_target: Option<PersonaRole>,
    /// For delegations: the context handed to the target.
    pub delegation_context: Option<String>,
    /// Set on messages that declare no progress.
    pub stuck: bool,
    /// The raw LLM response, kept for diagnostics.
    pub raw_response: Option<String>,
}

impl Message {
    /// Creates a message with a fresh id and timestamp. Optional fields
    /// start empty; use the `with_*` helpers to fill them in.
    pub fn new(
        session_id: impl Into<String>,
        from: PersonaRole,
        kind: MessageKind,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            from,
            to: None,
            content: content.into(),
            kind,
            reasoning: None,
            timestamp: Utc::now(),
            parent_id: None,
            delegate_target: None,
            delegation_context: None,
            stuck: false,
            raw_response: None,
        }
    }

    pub fn with_to(mut self, to: PersonaRole) -> Self {
        self.to = Some(to);
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    pub fn with_delegation(mut self, target: PersonaRole, context: impl Into<String>) -> Self {
        self.delegate_target = Some(target);
        self.delegation_context = Some(context.into());
        self
    }

    pub fn with_stuck(mut self) -> Self {
        self.stuck = true;
        self
    }

    pub fn with_raw_response(mut self, raw: impl Into<String>) -> Self {
        self.raw_response = Some(raw.into());
        self
    }
}
