//! Configuration loading.
//!
//! Reads the orchestrator configuration from an optional TOML file
//! (~/.config/conclave/config.toml by default) and caches it. A missing or
//! partial file falls back to the defaults field by field.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use tracing::warn;

use conclave_core::config::OrchestratorConfig;

/// Loads and caches the orchestrator configuration.
#[derive(Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
    cached: Arc<RwLock<Option<OrchestratorConfig>>>,
}

impl ConfigService {
    /// Uses the default location (~/.config/conclave/config.toml).
    pub fn new() -> Self {
        Self {
            path: dirs::config_dir().map(|dir| dir.join("conclave").join("config.toml")),
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Uses an explicit file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the configuration, loading it on first access.
    ///
    /// Load problems are logged and answered with the defaults: a broken
    /// config file must not keep the orchestrator from starting.
    pub fn get(&self) -> OrchestratorConfig {
        {
            let cached = self.cached.read().unwrap();
            if let Some(ref config) = *cached {
                return config.clone();
            }
        }

        let loaded = match self.load() {
            Ok(config) => config,
            Err(e) => {
                warn!("[ConfigService] Falling back to defaults: {}", e);
                OrchestratorConfig::default()
            }
        };

        let mut cached = self.cached.write().unwrap();
        *cached = Some(loaded.clone());
        loaded
    }

    /// Forces a reload on the next access.
    pub fn invalidate(&self) {
        let mut cached = self.cached.write().unwrap();
        *cached = None;
    }

    fn load(&self) -> Result<OrchestratorConfig> {
        let Some(ref path) = self.path else {
            return Ok(OrchestratorConfig::default());
        };
        if !path.exists() {
            return Ok(OrchestratorConfig::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}
