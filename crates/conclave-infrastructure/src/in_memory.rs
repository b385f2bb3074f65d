//! In-memory repository implementations.
//!
//! These back the default runtime and the test suites. Each repository is a
//! `RwLock`-guarded map or list; per-call thread safety is all the
//! orchestrator requires, since it serializes writes per session itself.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use conclave_core::memory::{Memory, MemoryRepository};
use conclave_core::persona::{PersonaConfigRepository, PersonaConfiguration, PersonaRole};
use conclave_core::session::{Message, MessageRepository, Session, SessionRepository};

/// Sessions keyed by id.
#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Session>> {
        let sessions = self.sessions.read().await;
        let mut all: Vec<Session> = sessions.values().cloned().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(all)
    }
}

/// Append-only message log, one vector per session.
#[derive(Default)]
pub struct InMemoryMessageRepository {
    messages: RwLock<HashMap<String, Vec<Message>>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn append(&self, message: &Message) -> Result<()> {
        let mut messages = self.messages.write().await;
        messages
            .entry(message.session_id.clone())
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn list_for_session(&self, session_id: &str) -> Result<Vec<Message>> {
        let messages = self.messages.read().await;
        Ok(messages.get(session_id).cloned().unwrap_or_default())
    }
}

/// Memories keyed by (session, persona, identifier), so an upsert with the
/// same key converges to one row.
#[derive(Default)]
pub struct InMemoryMemoryRepository {
    memories: RwLock<HashMap<(String, PersonaRole, String), Memory>>,
}

impl InMemoryMemoryRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn sorted_for(
        rows: &HashMap<(String, PersonaRole, String), Memory>,
        session_id: &str,
        persona: PersonaRole,
    ) -> Vec<Memory> {
        let mut found: Vec<Memory> = rows
            .values()
            .filter(|m| m.session_id == session_id && m.persona == persona)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found
    }
}

#[async_trait]
impl MemoryRepository for InMemoryMemoryRepository {
    async fn upsert(&self, memory: &Memory) -> Result<()> {
        let mut memories = self.memories.write().await;
        memories.insert(
            (
                memory.session_id.clone(),
                memory.persona,
                memory.identifier.clone(),
            ),
            memory.clone(),
        );
        Ok(())
    }

    async fn list_recent(
        &self,
        session_id: &str,
        persona: PersonaRole,
        limit: usize,
    ) -> Result<Vec<Memory>> {
        let memories = self.memories.read().await;
        let mut found = Self::sorted_for(&memories, session_id, persona);
        found.truncate(limit);
        Ok(found)
    }

    async fn find_by_identifier(
        &self,
        session_id: &str,
        persona: PersonaRole,
        identifier: &str,
    ) -> Result<Option<Memory>> {
        let memories = self.memories.read().await;
        Ok(memories
            .get(&(session_id.to_string(), persona, identifier.to_string()))
            .cloned())
    }

    async fn search(
        &self,
        session_id: &str,
        persona: PersonaRole,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Memory>> {
        let needle = query.to_lowercase();
        let memories = self.memories.read().await;
        let mut found: Vec<Memory> = Self::sorted_for(&memories, session_id, persona)
            .into_iter()
            .filter(|m| {
                m.identifier.to_lowercase().contains(&needle)
                    || m.content.to_lowercase().contains(&needle)
            })
            .collect();
        found.truncate(limit);
        Ok(found)
    }

    async fn record_access(&self, memory_ids: &[String]) -> Result<()> {
        let mut memories = self.memories.write().await;
        let now = Utc::now();
        for memory in memories.values_mut() {
            if memory_ids.contains(&memory.id) {
                memory.access_count += 1;
                memory.last_accessed_at = Some(now);
            }
        }
        Ok(())
    }
}

/// Persona configurations keyed by role.
#[derive(Default)]
pub struct InMemoryPersonaConfigRepository {
    configurations: RwLock<HashMap<PersonaRole, PersonaConfiguration>>,
}

impl InMemoryPersonaConfigRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl PersonaConfigRepository for InMemoryPersonaConfigRepository {
    async fn get_all(&self) -> Result<Vec<PersonaConfiguration>> {
        let configurations = self.configurations.read().await;
        let mut all: Vec<PersonaConfiguration> = configurations.values().cloned().collect();
        all.sort_by_key(|c| c.sort_order);
        Ok(all)
    }

    async fn find_by_role(&self, role: PersonaRole) -> Result<Option<PersonaConfiguration>> {
        let configurations = self.configurations.read().await;
        Ok(configurations.get(&role).cloned())
    }

    async fn save_all(&self, new: &[PersonaConfiguration]) -> Result<()> {
        let mut configurations = self.configurations.write().await;
        configurations.clear();
        for configuration in new {
            configurations.insert(configuration.role, configuration.clone());
        }
        Ok(())
    }
}
