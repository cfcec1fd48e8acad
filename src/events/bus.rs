//! Publish/subscribe bus with a queued dispatch loop.
//!
//! [`EventBus::publish`] only enqueues. Delivery happens when the queue is
//! drained, either by the async [`EventBus::run_dispatcher`] loop or by an
//! explicit [`EventBus::flush`]. [`EventBus::publish_sync`] skips the queue.

use std::{
    collections::{HashMap, VecDeque},
    future::Future,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use thiserror::Error;
use tokio::sync::{Notify, oneshot};

use super::event::{Event, EventKind};
use crate::utils::lock;

/// Callback invoked for each delivered event.
pub type Handler = Arc<dyn Fn(&Event) -> anyhow::Result<()> + Send + Sync>;

/// Transforms an event before it is queued. Returning `None` drops it.
pub type EventMiddleware = Arc<dyn Fn(Event) -> Option<Event> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BusError {
    #[error("timed out after {timeout:?} waiting for '{kind}'")]
    Timeout { kind: EventKind, timeout: Duration },
    #[error("event bus is shut down")]
    Closed,
    #[error("no Tokio runtime available")]
    NoRuntime,
}

#[derive(Clone)]
struct Subscription {
    id: SubscriptionId,
    label: String,
    handler: Handler,
}

pub struct EventBus {
    subscriptions: Mutex<HashMap<EventKind, Vec<Subscription>>>,
    middleware: Mutex<Vec<EventMiddleware>>,
    queue: Mutex<VecDeque<Event>>,
    wakeup: Notify,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("queued", &self.queued())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscriptions: Mutex::new(HashMap::new()),
            middleware: Mutex::new(Vec::new()),
            queue: Mutex::new(VecDeque::new()),
            wakeup: Notify::new(),
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
        }
    }

    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = self.next_subscription_id();
        self.insert(kind, id, format!("{}{}", kind, id), Arc::new(handler));
        id
    }

    /// Like [`subscribe`](Self::subscribe), with a label that appears in
    /// handler failure logs.
    pub fn subscribe_labeled<F>(
        &self,
        kind: EventKind,
        label: impl Into<String>,
        handler: F,
    ) -> SubscriptionId
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = self.next_subscription_id();
        self.insert(kind, id, label.into(), Arc::new(handler));
        id
    }

    /// Registers a shared handler. The same `Handler` may be added more than
    /// once and is then called once per registration.
    pub fn subscribe_handler(&self, kind: EventKind, handler: Handler) -> SubscriptionId {
        let id = self.next_subscription_id();
        self.insert(kind, id, format!("{}{}", kind, id), handler);
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = lock(&self.subscriptions);
        for list in subscriptions.values_mut() {
            if let Some(pos) = list.iter().position(|s| s.id == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        lock(&self.subscriptions).get(&kind).map_or(0, Vec::len)
    }

    pub fn use_middleware<F>(&self, middleware: F)
    where
        F: Fn(Event) -> Option<Event> + Send + Sync + 'static,
    {
        lock(&self.middleware).push(Arc::new(middleware));
    }

    /// Queues an event for the dispatcher. Events published after
    /// [`shutdown`](Self::shutdown) are discarded.
    pub fn publish(&self, event: impl Into<Event>) {
        if self.is_closed() {
            tracing::debug!("event bus closed; dropping event");
            return;
        }
        let Some(event) = self.apply_middleware(event.into()) else {
            return;
        };
        lock(&self.queue).push_back(event);
        self.wakeup.notify_one();
    }

    /// Delivers an event to its subscribers before returning.
    pub fn publish_sync(&self, event: impl Into<Event>) {
        if let Some(event) = self.apply_middleware(event.into()) {
            self.deliver(&event);
        }
    }

    /// Drains the queue on the calling thread, including events that handlers
    /// publish while it runs. Returns the number of events delivered.
    pub fn flush(&self) -> usize {
        let mut delivered = 0;
        loop {
            let next = lock(&self.queue).pop_front();
            match next {
                Some(event) => {
                    self.deliver(&event);
                    delivered += 1;
                }
                None => return delivered,
            }
        }
    }

    pub fn queued(&self) -> usize {
        lock(&self.queue).len()
    }

    /// Delivers queued events until [`shutdown`](Self::shutdown) is called.
    pub async fn run_dispatcher(&self) {
        tracing::debug!("event dispatcher started");
        loop {
            self.flush();
            if self.is_closed() {
                break;
            }
            self.wakeup.notified().await;
        }
        tracing::debug!("event dispatcher stopped");
    }

    /// Stops the dispatcher after it drains what is already queued.
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
        self.wakeup.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Resolves with the next event of `kind`, or fails after `timeout`.
    ///
    /// The subscription is registered before this returns, so an event
    /// published right after the call is not missed.
    pub fn wait_for(
        &self,
        kind: EventKind,
        timeout: Duration,
    ) -> impl Future<Output = Result<Event, BusError>> + '_ {
        self.wait_for_matching(kind, timeout, |_| true)
    }

    /// Like [`wait_for`](Self::wait_for), ignoring events the predicate rejects.
    pub fn wait_for_matching<P>(
        &self,
        kind: EventKind,
        timeout: Duration,
        predicate: P,
    ) -> impl Future<Output = Result<Event, BusError>> + '_
    where
        P: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let tx = Mutex::new(Some(tx));
        let closed = self.is_closed();
        let id = self.subscribe_labeled(kind, format!("wait_for:{}", kind), move |event| {
            if predicate(event)
                && let Some(tx) = lock(&tx).take()
            {
                let _ = tx.send(event.clone());
            }
            Ok(())
        });
        let guard = WaitGuard { bus: self, id };

        async move {
            let _guard = guard;
            if closed {
                return Err(BusError::Closed);
            }
            match tokio::time::timeout(timeout, rx).await {
                Ok(Ok(event)) => Ok(event),
                Ok(Err(_)) => Err(BusError::Closed),
                Err(_) => Err(BusError::Timeout { kind, timeout }),
            }
        }
    }

    fn next_subscription_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn insert(&self, kind: EventKind, id: SubscriptionId, label: String, handler: Handler) {
        lock(&self.subscriptions)
            .entry(kind)
            .or_default()
            .push(Subscription { id, label, handler });
    }

    fn apply_middleware(&self, event: Event) -> Option<Event> {
        let chain = lock(&self.middleware).clone();
        chain.iter().try_fold(event, |event, middleware| middleware(event))
    }

    fn deliver(&self, event: &Event) {
        let kind = event.kind();
        let snapshot = lock(&self.subscriptions)
            .get(&kind)
            .cloned()
            .unwrap_or_default();

        for subscription in snapshot {
            match catch_unwind(AssertUnwindSafe(|| (subscription.handler)(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(
                    subscription = %subscription.id,
                    handler = %subscription.label,
                    event = %kind,
                    error = %format!("{:#}", e),
                    "event handler failed"
                ),
                Err(_) => tracing::error!(
                    subscription = %subscription.id,
                    handler = %subscription.label,
                    event = %kind,
                    "event handler panicked"
                ),
            }
        }
    }
}

struct WaitGuard<'a> {
    bus: &'a EventBus,
    id: SubscriptionId,
}

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.id);
    }
}
