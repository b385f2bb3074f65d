//! LLM client contract.
//!
//! The orchestration core only ever sees this trait: one method that takes
//! a request and returns content or an error. Concrete backends (HTTP
//! providers, scripted test doubles) live outside the core.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Who authored a chat message, in provider terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One entry in the request's message list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A single completion request built by the persona engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier from the persona configuration.
    pub model: String,
    /// The persona's system prompt.
    pub system_prompt: String,
    /// Conversation slice, memories and the incoming message, in order.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature from the persona configuration.
    pub temperature: f32,
    /// Completion token cap from the persona configuration.
    pub max_tokens: u32,
}

/// The provider's reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
}

/// Contract for LLM backends.
///
/// Errors carry the provider's message; the engine converts them into a
/// Stuck action rather than propagating.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}
