//! Conclave core: domain models and contracts for the session orchestrator.
//!
//! This crate holds the "pure" side of the system: the session aggregate
//! and its state machine, the persona roster and configurations, the
//! memory store, the response-parsing grammar, and the traits the
//! orchestrator consumes (repositories, event broadcaster, LLM client).
//! Concrete adapters live in `conclave-infrastructure`; the dispatch loop
//! lives in `conclave-application`.

pub mod config;
pub mod error;
pub mod event;
pub mod llm;
pub mod memory;
pub mod parser;
pub mod persona;
pub mod session;

// Re-export the common error type
pub use error::{ConclaveError, Result};
