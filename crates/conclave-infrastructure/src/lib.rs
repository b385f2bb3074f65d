//! Conclave infrastructure: concrete adapters for the core contracts.
//!
//! In-memory repositories, the broadcast-channel event bus, the HTTP LLM
//! client and configuration loading. Everything here implements a trait
//! from `conclave-core`; nothing here knows about the dispatch loop.

pub mod broadcast;
pub mod config_service;
pub mod in_memory;
pub mod llm_http;
pub mod seed;

pub use broadcast::BroadcastEventBus;
pub use config_service::ConfigService;
pub use in_memory::{
    InMemoryMemoryRepository, InMemoryMessageRepository, InMemoryPersonaConfigRepository,
    InMemorySessionRepository,
};
pub use llm_http::HttpLlmClient;
pub use seed::seed_default_personas;
