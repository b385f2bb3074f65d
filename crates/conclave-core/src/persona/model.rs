//! Persona configuration model.
//!
//! Each roster role carries static-but-overridable LLM settings. The
//! defaults are seeded once at startup (see `preset`); operators may edit
//! the persisted rows afterwards.

use serde::{Deserialize, Serialize};

use super::role::PersonaRole;

/// LLM settings for one roster role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaConfiguration {
    /// The roster role this configuration belongs to.
    pub role: PersonaRole,
    /// Display name of the persona.
    pub display_name: String,
    /// Model identifier passed to the LLM backend.
    pub model: String,
    /// System prompt establishing the persona's behavior and the tag protocol.
    pub system_prompt: String,
    /// Sampling temperature, 0.0 to 1.0.
    pub temperature: f32,
    /// Completion token cap.
    pub max_tokens: u32,
    /// Disabled personas are skipped by the default flow.
    pub enabled: bool,
    /// Position when listing the roster.
    pub sort_order: u32,
}

impl PersonaConfiguration {
    /// Validates ranges the rest of the system assumes.
    pub fn validate(&self) -> Result<(), String> {
        if self.display_name.trim().is_empty() {
            return Err("Display name is required and cannot be empty".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("Model identifier is required and cannot be empty".to_string());
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(format!(
                "Temperature must be between 0.0 and 1.0, got {}",
                self.temperature
            ));
        }
        if self.max_tokens == 0 {
            return Err("Max tokens must be greater than zero".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PersonaConfiguration {
        PersonaConfiguration {
            role: PersonaRole::Coordinator,
            display_name: "Coordinator".to_string(),
            model: "gpt-4o".to_string(),
            system_prompt: "You coordinate the team.".to_string(),
            temperature: 0.4,
            max_tokens: 2048,
            enabled: true,
            sort_order: 0,
        }
    }

    #[test]
    fn test_validate_success() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_validate_temperature_range() {
        let mut cfg = config();
        cfg.temperature = 1.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_empty_model() {
        let mut cfg = config();
        cfg.model = "  ".to_string();
        assert!(cfg.validate().is_err());
    }
}
