//! Persona configuration repository trait.
//!
//! Defines the interface for persona configuration persistence.

use anyhow::Result;
use async_trait::async_trait;

use super::model::PersonaConfiguration;
use super::role::PersonaRole;

/// An abstract repository for persona configurations.
///
/// This trait defines the contract for persisting and retrieving persona
/// settings, decoupling the orchestration logic from the specific storage
/// mechanism (in-memory, TOML files, database).
#[async_trait]
pub trait PersonaConfigRepository: Send + Sync {
    /// Retrieves all stored configurations, in sort order.
    async fn get_all(&self) -> Result<Vec<PersonaConfiguration>>;

    /// Looks up the configuration for one role.
    async fn find_by_role(&self, role: PersonaRole) -> Result<Option<PersonaConfiguration>>;

    /// Saves all configurations, replacing existing ones.
    async fn save_all(&self, configurations: &[PersonaConfiguration]) -> Result<()>;
}
