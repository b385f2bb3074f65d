//! Persona memory model.
//!
//! A memory is a session-scoped note a persona stores for itself with a
//! `[STORE:identifier]` directive. Memories never outlive their session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persona::PersonaRole;

/// A session-scoped note owned by one persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    /// Unique memory identifier (UUID format).
    pub id: String,
    /// The session this memory belongs to.
    pub session_id: String,
    /// The persona that stored it.
    pub persona: PersonaRole,
    /// Short handle the persona uses to recall the note. At most 10
    /// whitespace-separated tokens; unique per (session, persona).
    pub identifier: String,
    /// The note itself. At most 2000 whitespace-separated tokens.
    pub content: String,
    /// When the memory was stored (refreshed on overwrite).
    pub created_at: DateTime<Utc>,
    /// How many times the memory has been surfaced.
    pub access_count: u64,
    /// When the memory was last surfaced.
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl Memory {
    /// Creates a fresh memory row. Validation of the identifier and content
    /// limits happens in the store, before this constructor runs.
    pub fn new(
        session_id: impl Into<String>,
        persona: PersonaRole,
        identifier: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            persona,
            identifier: identifier.into(),
            content: content.into(),
            created_at: Utc::now(),
            access_count: 0,
            last_accessed_at: None,
        }
    }
}
