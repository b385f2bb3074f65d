//! Session domain model.
//!
//! The Session is the root aggregate: it owns the conversation and the
//! persona memories recorded under its id. All writes go through the
//! orchestrator, which serializes them per session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::SessionStatus;
use crate::persona::PersonaRole;

/// Maximum title length derived from the problem statement.
const TITLE_MAX_CHARS: usize = 80;

/// One problem-solving conversation, end to end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier (UUID format).
    pub id: String,
    /// Human-readable title derived from the problem statement.
    pub title: String,
    /// The user's problem statement. Immutable after creation.
    pub problem_statement: String,
    /// Current lifecycle state.
    pub status: SessionStatus,
    /// The compiled final solution. `Some` iff status is `Completed`.
    pub final_solution: Option<String>,
    /// Timestamp when the session was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
    /// The persona about to run. `Some` iff status is Active or
    /// WaitingForClarification.
    pub current_persona: Option<PersonaRole>,
}

impl Session {
    /// Creates a new Active session for the given problem statement.
    ///
    /// The caller has already validated that the problem is non-blank. The
    /// Coordinator is put on deck; the problem-statement message itself is
    /// appended by the orchestrator.
    pub fn new(problem_statement: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: derive_title(&problem_statement),
            problem_statement,
            status: SessionStatus::Active,
            final_solution: None,
            created_at: now,
            updated_at: now,
            current_persona: Some(PersonaRole::Coordinator),
        }
    }

    /// Refreshes the last-update timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Derives a single-line title from a problem statement: whitespace is
/// collapsed and the result is cut at 80 characters with an ellipsis.
pub fn derive_title(problem: &str) -> String {
    let collapsed = problem.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= TITLE_MAX_CHARS {
        return collapsed;
    }
    let cut: String = collapsed.chars().take(TITLE_MAX_CHARS).collect();
    format!("{}…", cut.trim_end())
}
