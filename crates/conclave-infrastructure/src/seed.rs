//! Idempotent persona seeding.

use anyhow::Result;
use tracing::info;

use conclave_core::persona::{PersonaConfigRepository, default_configurations};

/// Writes the ten default persona configurations when the repository is
/// empty. Returns true when seeding happened. Safe to call on every
/// startup; existing rows (including operator edits) are left alone.
pub async fn seed_default_personas(repository: &dyn PersonaConfigRepository) -> Result<bool> {
    let existing = repository.get_all().await?;
    if !existing.is_empty() {
        return Ok(false);
    }

    let presets = default_configurations();
    repository.save_all(&presets).await?;
    info!("[Seed] Seeded {} default personas", presets.len());
    Ok(true)
}
