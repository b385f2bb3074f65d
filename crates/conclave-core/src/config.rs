//! Orchestration configuration.
//!
//! All knobs that govern the dispatch loop and memory admission live here.
//! Values deserialize from an optional TOML override file; every field has
//! a default so a missing file or a partial file both work.

use serde::{Deserialize, Serialize};

/// Tunable limits for the session orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Turn cap per session. Exceeding it terminates the session as Stuck.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Consecutive-stuck cap across any personas.
    #[serde(default = "default_stuck_streak_limit")]
    pub stuck_streak_limit: u32,

    /// How many recent conversation messages each persona sees per turn.
    #[serde(default = "default_conversation_window")]
    pub conversation_window: usize,

    /// How many recent memories are surfaced to a persona per turn.
    #[serde(default = "default_recent_memories_window")]
    pub recent_memories_window: usize,

    /// Admission limit for memory content, counted as whitespace-split words.
    #[serde(default = "default_max_memory_content_tokens")]
    pub max_memory_content_tokens: usize,

    /// Admission limit for memory identifiers, counted as whitespace-split words.
    #[serde(default = "default_max_memory_identifier_tokens")]
    pub max_memory_identifier_tokens: usize,

    /// Upper bound on a single LLM call, in seconds.
    #[serde(default = "default_llm_timeout_secs")]
    pub llm_timeout_secs: u64,
}

fn default_max_depth() -> u32 {
    50
}

fn default_stuck_streak_limit() -> u32 {
    5
}

fn default_conversation_window() -> usize {
    20
}

fn default_recent_memories_window() -> usize {
    10
}

fn default_max_memory_content_tokens() -> usize {
    2000
}

fn default_max_memory_identifier_tokens() -> usize {
    10
}

fn default_llm_timeout_secs() -> u64 {
    120
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            stuck_streak_limit: default_stuck_streak_limit(),
            conversation_window: default_conversation_window(),
            recent_memories_window: default_recent_memories_window(),
            max_memory_content_tokens: default_max_memory_content_tokens(),
            max_memory_identifier_tokens: default_max_memory_identifier_tokens(),
            llm_timeout_secs: default_llm_timeout_secs(),
        }
    }
}
