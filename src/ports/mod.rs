//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the simulation engine and its collaborators. Adapters implement these ports.
//!
//! ## Content
//!
//! - `ScenarioStore` - Read-only scenario lookup
//!
//! ## Persistence
//!
//! - `KeyValueStore` - Best-effort progress storage
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Port for publishing domain events
//! - `EventSubscriber` - Port for subscribing to domain events
//! - `EventHandler` - Handler that processes incoming events

mod event_publisher;
mod event_subscriber;
mod key_value_store;
mod scenario_store;

pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventBus, EventHandler, EventSubscriber};
pub use key_value_store::{KeyValueStore, StorageError};
pub use scenario_store::ScenarioStore;
