//! Memory store: admission limits and retrieval semantics on top of the
//! repository contract.
//!
//! The store owns the rules (word-count limits, overwrite-on-same-key,
//! access counting) while persistence itself is delegated to whatever
//! `MemoryRepository` is plugged in.

use std::sync::Arc;

use tracing::warn;

use super::model::Memory;
use super::repository::MemoryRepository;
use crate::error::{ConclaveError, Result};
use crate::persona::PersonaRole;

/// Default number of results for recency and search queries.
const DEFAULT_WINDOW: usize = 10;

/// Enforces memory admission limits and retrieval ordering.
pub struct MemoryStore {
    repository: Arc<dyn MemoryRepository>,
    max_identifier_tokens: usize,
    max_content_tokens: usize,
}

impl MemoryStore {
    /// Creates a store with the given admission limits.
    pub fn new(
        repository: Arc<dyn MemoryRepository>,
        max_identifier_tokens: usize,
        max_content_tokens: usize,
    ) -> Self {
        Self {
            repository,
            max_identifier_tokens,
            max_content_tokens,
        }
    }

    /// Stores a memory, overwriting any previous one with the same
    /// (session, persona, identifier).
    ///
    /// # Errors
    ///
    /// `InvalidInput` when the identifier is empty or either the identifier
    /// or the content exceeds its word limit. `TransientBackend` when the
    /// repository fails.
    pub async fn store(
        &self,
        session_id: &str,
        persona: PersonaRole,
        identifier: &str,
        content: &str,
    ) -> Result<Memory> {
        let identifier = identifier.trim();
        let content = content.trim();

        if identifier.is_empty() {
            return Err(ConclaveError::InvalidInput(
                "Memory identifier cannot be empty".to_string(),
            ));
        }
        let identifier_tokens = word_count(identifier);
        if identifier_tokens > self.max_identifier_tokens {
            return Err(ConclaveError::InvalidInput(format!(
                "Memory identifier has {} tokens, limit is {}",
                identifier_tokens, self.max_identifier_tokens
            )));
        }
        let content_tokens = word_count(content);
        if content_tokens > self.max_content_tokens {
            return Err(ConclaveError::InvalidInput(format!(
                "Memory content has {} tokens, limit is {}",
                content_tokens, self.max_content_tokens
            )));
        }

        let memory = Memory::new(session_id, persona, identifier, content);
        self.repository
            .upsert(&memory)
            .await
            .map_err(|e| ConclaveError::TransientBackend(e.to_string()))?;
        Ok(memory)
    }

    /// Returns up to `limit` memories, newest first, counting each access.
    pub async fn get_recent(
        &self,
        session_id: &str,
        persona: PersonaRole,
        limit: Option<usize>,
    ) -> Result<Vec<Memory>> {
        let memories = self
            .repository
            .list_recent(session_id, persona, limit.unwrap_or(DEFAULT_WINDOW))
            .await
            .map_err(|e| ConclaveError::TransientBackend(e.to_string()))?;
        self.touch_access(&memories).await;
        Ok(memories)
    }

    /// Looks up one memory by identifier, counting the access when found.
    pub async fn get_by_identifier(
        &self,
        session_id: &str,
        persona: PersonaRole,
        identifier: &str,
    ) -> Result<Option<Memory>> {
        let found = self
            .repository
            .find_by_identifier(session_id, persona, identifier.trim())
            .await
            .map_err(|e| ConclaveError::TransientBackend(e.to_string()))?;
        if let Some(ref memory) = found {
            self.touch_access(std::slice::from_ref(memory)).await;
        }
        Ok(found)
    }

    /// Case-insensitive substring search across identifier and content,
    /// newest first, at most 10 results.
    pub async fn search(
        &self,
        session_id: &str,
        persona: PersonaRole,
        query: &str,
    ) -> Result<Vec<Memory>> {
        self.repository
            .search(session_id, persona, query, DEFAULT_WINDOW)
            .await
            .map_err(|e| ConclaveError::TransientBackend(e.to_string()))
    }

    /// Access accounting is best-effort; a failed bump never fails a read.
    async fn touch_access(&self, memories: &[Memory]) {
        if memories.is_empty() {
            return;
        }
        let ids: Vec<String> = memories.iter().map(|m| m.id.clone()).collect();
        if let Err(e) = self.repository.record_access(&ids).await {
            warn!("[MemoryStore] Failed to record memory access: {}", e);
        }
    }
}

/// Word counting is a plain whitespace split; no locale-aware tokenization.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
