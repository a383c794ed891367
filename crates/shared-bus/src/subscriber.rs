//! # Event Subscriber
//!
//! The consuming side of the bus: handler registration and stream-style
//! subscriptions.

use crate::channel::Channel;
use crate::publisher::HandlerRegistry;
use async_trait::async_trait;
use shared_types::Event;
use std::fmt;
use std::sync::Weak;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

/// Identifier of a registered handler, used to unsubscribe it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Failure reported by an event handler.
///
/// The bus logs it and moves on to the next handler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler could not process the event.
    #[error("handler failed: {0}")]
    Failed(String),

    /// The consumer behind the handler went away.
    #[error("handler closed")]
    Closed,
}

impl HandlerError {
    /// Convenience constructor for [`HandlerError::Failed`].
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }
}

/// A consumer of events published on a channel.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process one event.
    async fn handle(&self, event: &Event) -> Result<(), HandlerError>;
}

/// Adapter turning a synchronous closure into an [`EventHandler`].
pub struct FnHandler<F> {
    f: F,
}

#[async_trait]
impl<F> EventHandler for FnHandler<F>
where
    F: Fn(&Event) -> Result<(), HandlerError> + Send + Sync,
{
    async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        (self.f)(event)
    }
}

/// Wrap a closure as an event handler.
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&Event) -> Result<(), HandlerError> + Send + Sync,
{
    FnHandler { f }
}

/// Forwards every event into a [`Subscription`]'s queue.
pub(crate) struct StreamForwarder {
    pub(crate) sender: mpsc::UnboundedSender<Event>,
}

#[async_trait]
impl EventHandler for StreamForwarder {
    async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        self.sender
            .send(event.clone())
            .map_err(|_| HandlerError::Closed)
    }
}

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The event bus was dropped.
    #[error("Event bus closed")]
    Closed,
}

/// A stream-style subscription to one channel.
///
/// Events are queued without bound until received. When dropped, the
/// subscription removes itself from the bus.
pub struct Subscription {
    id: SubscriptionId,
    channel: Channel,
    receiver: mpsc::UnboundedReceiver<Event>,
    registry: Weak<HandlerRegistry>,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriptionId,
        channel: Channel,
        receiver: mpsc::UnboundedReceiver<Event>,
        registry: Weak<HandlerRegistry>,
    ) -> Self {
        Self {
            id,
            channel,
            receiver,
            registry,
        }
    }

    /// Receive the next event.
    ///
    /// Returns `None` once the bus has been dropped and the queue is drained.
    pub async fn recv(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Receive the next event without waiting.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(event))` - An event was queued
    /// - `Ok(None)` - Nothing queued yet
    /// - `Err(SubscriptionError::Closed)` - The bus was dropped
    pub fn try_recv(&mut self) -> Result<Option<Event>, SubscriptionError> {
        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(SubscriptionError::Closed),
        }
    }

    /// The subscription's id on the bus.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// The channel this subscription listens on.
    pub fn channel(&self) -> &Channel {
        &self.channel
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        registry.remove(self.id);
        debug!(channel = %self.channel, id = %self.id, "Subscription dropped");
    }
}
