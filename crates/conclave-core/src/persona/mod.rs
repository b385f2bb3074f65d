//! Persona roster, configuration and persistence contract.

pub mod model;
pub mod preset;
pub mod repository;
pub mod role;

pub use model::PersonaConfiguration;
pub use preset::default_configurations;
pub use repository::PersonaConfigRepository;
pub use role::PersonaRole;
