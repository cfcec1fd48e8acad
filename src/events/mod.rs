//! Change notifications between the store, scanner, cache and watcher.

pub mod aggregator;
pub mod bus;
pub mod event;

pub use aggregator::EventAggregator;
pub use bus::{BusError, EventBus, EventMiddleware, Handler, SubscriptionId};
pub use event::{ChangeType, Event, EventKind, EventPayload};
