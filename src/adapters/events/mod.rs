//! Event bus adapters.
//!
//! - `LocalEventBus` - In-process bus with envelope capture

mod local_bus;

pub use local_bus::LocalEventBus;
