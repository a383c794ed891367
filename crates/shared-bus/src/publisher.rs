//! # Event Publisher
//!
//! The publishing side of the bus and its in-memory implementation.

use crate::channel::Channel;
use crate::subscriber::{EventHandler, StreamForwarder, Subscription, SubscriptionId};
use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::RwLock;
use shared_types::Event;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Outcome of publishing one event on one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Handlers that processed the event successfully.
    pub delivered: usize,
    /// Handlers that returned an error or panicked.
    pub failed: usize,
}

impl DispatchReport {
    /// Number of handlers that were invoked.
    pub fn invoked(&self) -> usize {
        self.delivered + self.failed
    }
}

/// Trait for publishing events to the bus.
///
/// This is the seam the protocol gateway depends on.
#[async_trait]
pub trait EventDispatcher: Send + Sync {
    /// Publish an event on a channel.
    ///
    /// Every handler registered on `channel` is invoked, in subscription
    /// order, before this returns. A failing handler does not stop delivery
    /// to the others.
    async fn publish(&self, channel: &Channel, event: &Event) -> DispatchReport;

    /// Total number of publish calls.
    fn events_published(&self) -> u64;
}

struct Registered {
    id: SubscriptionId,
    handler: Arc<dyn EventHandler>,
}

/// Channel → handlers table shared between the bus and its subscriptions.
#[derive(Default)]
pub(crate) struct HandlerRegistry {
    handlers: RwLock<HashMap<Channel, Vec<Registered>>>,
}

impl HandlerRegistry {
    fn insert(&self, channel: Channel, id: SubscriptionId, handler: Arc<dyn EventHandler>) {
        self.handlers
            .write()
            .entry(channel)
            .or_default()
            .push(Registered { id, handler });
    }

    pub(crate) fn remove(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write();
        let mut removed = false;
        handlers.retain(|_, list| {
            let before = list.len();
            list.retain(|r| r.id != id);
            removed |= list.len() != before;
            !list.is_empty()
        });
        removed
    }

    /// Clone the handler list so no lock is held while handlers run.
    fn snapshot(&self, channel: &Channel) -> Vec<(SubscriptionId, Arc<dyn EventHandler>)> {
        self.handlers
            .read()
            .get(channel)
            .map(|list| {
                list.iter()
                    .map(|r| (r.id, Arc::clone(&r.handler)))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn count(&self, channel: &Channel) -> usize {
        self.handlers.read().get(channel).map_or(0, Vec::len)
    }

    fn total(&self) -> usize {
        self.handlers.read().values().map(Vec::len).sum()
    }
}

/// In-memory implementation of the event bus.
///
/// Handlers are invoked inline by `publish`, so a caller that awaits each
/// publish in turn observes strict arrival order.
pub struct InMemoryEventBus {
    registry: Arc<HandlerRegistry>,
    next_id: AtomicU64,
    events_published: AtomicU64,
    handler_failures: AtomicU64,
}

impl InMemoryEventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(HandlerRegistry::default()),
            next_id: AtomicU64::new(1),
            events_published: AtomicU64::new(0),
            handler_failures: AtomicU64::new(0),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Register a handler on a channel.
    pub fn subscribe(&self, channel: Channel, handler: Arc<dyn EventHandler>) -> SubscriptionId {
        let id = self.next_id();
        debug!(channel = %channel, id = %id, "Handler subscribed");
        self.registry.insert(channel, id, handler);
        id
    }

    /// Register any [`EventHandler`] value, boxing it for the caller.
    pub fn subscribe_handler<H>(&self, channel: Channel, handler: H) -> SubscriptionId
    where
        H: EventHandler + 'static,
    {
        self.subscribe(channel, Arc::new(handler))
    }

    /// Subscribe to a channel as a queue of events.
    #[must_use]
    pub fn subscribe_stream(&self, channel: Channel) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = self.subscribe(channel.clone(), Arc::new(StreamForwarder { sender }));
        Subscription::new(id, channel, receiver, Arc::downgrade(&self.registry))
    }

    /// Remove a handler. Returns `false` if the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.registry.remove(id);
        debug!(id = %id, removed, "Handler unsubscribed");
        removed
    }

    /// Number of handlers registered on a channel.
    #[must_use]
    pub fn handler_count(&self, channel: &Channel) -> usize {
        self.registry.count(channel)
    }

    /// Number of handlers across all channels.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.registry.total()
    }

    /// Total handler invocations that failed.
    #[must_use]
    pub fn handler_failures(&self) -> u64 {
        self.handler_failures.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventDispatcher for InMemoryEventBus {
    async fn publish(&self, channel: &Channel, event: &Event) -> DispatchReport {
        self.events_published.fetch_add(1, Ordering::Relaxed);

        let handlers = self.registry.snapshot(channel);
        let mut report = DispatchReport::default();

        for (id, handler) in handlers {
            match AssertUnwindSafe(handler.handle(event)).catch_unwind().await {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    report.failed += 1;
                    warn!(channel = %channel, id = %id, error = %e, "Event handler failed");
                }
                Err(_) => {
                    report.failed += 1;
                    warn!(channel = %channel, id = %id, "Event handler panicked");
                }
            }
        }

        if report.failed > 0 {
            self.handler_failures
                .fetch_add(report.failed as u64, Ordering::Relaxed);
        }

        debug!(
            channel = %channel,
            delivered = report.delivered,
            failed = report.failed,
            "Event published"
        );
        report
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
