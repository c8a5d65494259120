//! EventSubscriber port - Interface for listening to simulation events.
//!
//! UI layers and telemetry sinks register handlers for the topics they care
//! about (`session.started`, `action.processed`, `session.completed`).

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Handler for processing domain events.
///
/// A failing handler must not prevent other handlers from running.
///
/// # Example
///
/// ```ignore
/// struct ScoreBoard { /* ... */ }
///
/// #[async_trait]
/// impl EventHandler for ScoreBoard {
///     async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
///         let payload: ActionProcessed = event.payload_as()?;
///         // Refresh the on-screen score...
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "ScoreBoard"
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process an event.
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Port for subscribing to domain events.
///
/// # Example
///
/// ```ignore
/// subscriber.subscribe("session.completed", report_writer);
/// subscriber.subscribe_all(&ALL_TOPICS, telemetry);
/// ```
pub trait EventSubscriber: Send + Sync {
    /// Subscribe handler to a specific event type.
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>);

    /// Subscribe handler to multiple event types.
    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>);
}

/// Combined trait for event bus implementations.
pub trait EventBus: super::EventPublisher + EventSubscriber {}

impl<T: super::EventPublisher + EventSubscriber> EventBus for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_handler_object_safe(_: &dyn EventHandler) {}

    #[allow(dead_code)]
    fn assert_subscriber_object_safe(_: &dyn EventSubscriber) {}

    #[allow(dead_code)]
    fn assert_bus_object_safe(_: &dyn EventBus) {}

    #[allow(dead_code)]
    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn event_handler_is_send_sync() {
        #[allow(dead_code)]
        fn check<T: EventHandler>() {
            assert_send_sync::<T>();
        }
    }
}
