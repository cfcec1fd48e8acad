use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::runtime::Handle;

use super::bus::{BusError, EventBus};
use super::event::{Event, EventPayload};
use crate::utils::lock;

struct Burst {
    events: Vec<Event>,
    generation: u64,
}

/// Debounces bursts of events into a single `Aggregated` event per key.
///
/// Each call to [`aggregate`](Self::aggregate) restarts the key's timer. When a
/// key stays quiet for the delay, everything collected under it is published
/// at once.
pub struct EventAggregator {
    bus: Arc<EventBus>,
    runtime: Handle,
    pending: Arc<Mutex<HashMap<String, Burst>>>,
}

impl EventAggregator {
    /// Uses the Tokio runtime of the calling context.
    pub fn new(bus: Arc<EventBus>) -> Result<Self, BusError> {
        let runtime = Handle::try_current().map_err(|_| BusError::NoRuntime)?;
        Ok(Self::with_runtime(bus, runtime))
    }

    pub fn with_runtime(bus: Arc<EventBus>, runtime: Handle) -> Self {
        Self {
            bus,
            runtime,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn aggregate(&self, event: Event, key: &str, delay: Duration) {
        let source = event.kind();
        let slot = format!("{}:{}", source, key);

        let generation = {
            let mut pending = lock(&self.pending);
            let burst = pending.entry(slot.clone()).or_insert_with(|| Burst {
                events: Vec::new(),
                generation: 0,
            });
            burst.events.push(event);
            burst.generation += 1;
            burst.generation
        };

        let pending = Arc::clone(&self.pending);
        let bus = Arc::clone(&self.bus);
        let key = key.to_string();
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let burst = {
                let mut pending = lock(&pending);
                match pending.get(&slot) {
                    Some(burst) if burst.generation == generation => pending.remove(&slot),
                    _ => None,
                }
            };
            if let Some(burst) = burst {
                tracing::debug!(source = %source, key = %key, count = burst.events.len(), "publishing aggregated events");
                bus.publish(EventPayload::Aggregated {
                    source,
                    key,
                    events: burst.events,
                });
            }
        });
    }

    /// Number of keys with a burst still waiting for its timer.
    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }
}
