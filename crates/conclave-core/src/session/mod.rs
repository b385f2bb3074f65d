//! Session aggregate: model, messages, status machine, DTOs and the
//! persistence contract.

pub mod dto;
pub mod message;
pub mod model;
pub mod repository;
pub mod status;

pub use dto::{MessageRecord, SessionSummary};
pub use message::{Message, MessageKind};
pub use model::Session;
pub use repository::{MessageRepository, SessionRepository};
pub use status::SessionStatus;
