//! Session-scoped persona memories: model, persistence contract and the
//! limit-enforcing store.

pub mod model;
pub mod repository;
pub mod store;

pub use model::Memory;
pub use repository::MemoryRepository;
pub use store::{MemoryStore, word_count};
