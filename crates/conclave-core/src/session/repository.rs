//! Session and message repository traits.
//!
//! These traits define the persistence contract the orchestrator consumes,
//! decoupling it from the specific storage mechanism (in-memory, database,
//! remote API). Repositories are assumed thread-safe per call; ordering
//! guarantees within a session come from the orchestrator's per-session
//! serialization.

use anyhow::Result;
use async_trait::async_trait;

use super::message::Message;
use super::model::Session;

/// An abstract repository for session persistence.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Finds a session by its ID.
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>>;

    /// Saves a session, inserting or replacing it.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Lists all stored sessions, most recently updated first.
    async fn list_all(&self) -> Result<Vec<Session>>;
}

/// An abstract repository for conversation messages.
///
/// Messages are append-only; `list_for_session` must return them in
/// insertion order, which by construction is timestamp order.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Appends a message to its session's conversation.
    async fn append(&self, message: &Message) -> Result<()>;

    /// Returns the full conversation for a session, oldest first.
    async fn list_for_session(&self, session_id: &str) -> Result<Vec<Message>>;
}
