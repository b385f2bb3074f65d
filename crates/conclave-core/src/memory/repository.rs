//! Memory repository trait.

use anyhow::Result;
use async_trait::async_trait;

use super::model::Memory;
use crate::persona::PersonaRole;

/// An abstract repository for persona memories.
///
/// Implementations must enforce uniqueness of (session, persona,
/// identifier): `upsert` replaces an existing row with the same key.
#[async_trait]
pub trait MemoryRepository: Send + Sync {
    /// Inserts a memory, replacing any existing row with the same
    /// (session, persona, identifier).
    async fn upsert(&self, memory: &Memory) -> Result<()>;

    /// Returns up to `limit` memories for the persona, newest first.
    async fn list_recent(
        &self,
        session_id: &str,
        persona: PersonaRole,
        limit: usize,
    ) -> Result<Vec<Memory>>;

    /// Looks up a memory by its identifier.
    async fn find_by_identifier(
        &self,
        session_id: &str,
        persona: PersonaRole,
        identifier: &str,
    ) -> Result<Option<Memory>>;

    /// Case-insensitive substring search across identifier and content,
    /// newest first, up to `limit` rows.
    async fn search(
        &self,
        session_id: &str,
        persona: PersonaRole,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Memory>>;

    /// Bumps access counters and last-access timestamps for the given rows.
    async fn record_access(&self, memory_ids: &[String]) -> Result<()>;
}
