//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, event infrastructure and error types
//! that form the vocabulary of the simulation domain.

mod errors;
mod events;
mod ids;
mod percentage;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{
    domain_event, DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent,
};
pub use ids::{ActionId, CriterionId, ResultId, ScenarioId, SessionId};
pub use percentage::Percentage;
pub use timestamp::Timestamp;
