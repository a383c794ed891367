//! Default consumers wired by the runtime.
//!
//! A bridge embedding the library crates supplies its own handlers and
//! resolvers. The standalone binary only logs what it receives and accepts
//! every query inside its claimed namespaces.

use as_03_protocol_gateway::{QueryResolver, ResolveError};
use async_trait::async_trait;
use shared_bus::{EventHandler, HandlerError};
use shared_types::Event;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Logs every event it receives.
#[derive(Debug)]
pub struct LoggingEventHandler {
    kind: &'static str,
    seen: AtomicU64,
}

impl LoggingEventHandler {
    /// `kind` labels the log line (`event` or `ephemeral`).
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            seen: AtomicU64::new(0),
        }
    }

    pub fn seen(&self) -> u64 {
        self.seen.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl EventHandler for LoggingEventHandler {
    async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        self.seen.fetch_add(1, Ordering::Relaxed);
        info!(
            kind = self.kind,
            event_type = event.event_type().unwrap_or("<untyped>"),
            event_id = event.event_id().unwrap_or("-"),
            room_id = event.room_id().unwrap_or("-"),
            "Received event"
        );
        Ok(())
    }
}

/// Accepts every identifier that reaches it.
///
/// The gateway answers queries outside the registration's namespaces with
/// `M_NOT_FOUND` before calling a resolver, so this only sees claimed ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClaimedNamespaceResolver;

#[async_trait]
impl QueryResolver for ClaimedNamespaceResolver {
    async fn resolve(&self, id: &str) -> Result<(), ResolveError> {
        info!(id = %id, "Accepting query for claimed identifier");
        Ok(())
    }
}
