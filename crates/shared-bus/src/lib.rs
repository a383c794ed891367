//! # Shared Bus - Event Fan-out for Protocol Events
//!
//! Decouples the protocol gateway from whoever consumes the events it
//! receives.
//!
//! ```text
//! ┌──────────────────┐                      ┌──────────────────┐
//! │ Protocol Gateway │     publish()        │  Event Handler   │
//! │                  │ ──────┐              │  (bridge logic)  │
//! └──────────────────┘       │              └──────────────────┘
//!                            ▼                       ↑
//!                   ┌──────────────────┐             │
//!                   │  InMemoryEventBus │ ────────────┘
//!                   │  channel → [h..]  │  subscribe(channel, h)
//!                   └──────────────────┘
//! ```
//!
//! ## Channels
//!
//! - `event`: every ordinary event
//! - `type:<event type>`: ordinary events with that declared type
//! - `ephemeral`: every ephemeral event
//! - `ephemeral_type:<event type>`: ephemeral events with that declared type
//!
//! ## Fault isolation
//!
//! Handlers run one after another in subscription order. A handler that
//! returns an error or panics is logged and counted; the remaining handlers
//! still receive the event.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod channel;
pub mod publisher;
pub mod subscriber;

pub use channel::{Channel, ChannelParseError};
pub use publisher::{DispatchReport, EventDispatcher, InMemoryEventBus};
pub use subscriber::{
    handler_fn, EventHandler, FnHandler, HandlerError, Subscription, SubscriptionError,
    SubscriptionId,
};
