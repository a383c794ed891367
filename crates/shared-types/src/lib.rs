//! # Shared Types Crate
//!
//! Wire-level entities exchanged between the protocol gateway and the
//! subscribers of the event bus.
//!
//! ## Design Principles
//!
//! - **Opaque events**: the core never interprets an event beyond its
//!   optional `type` field. The raw JSON is kept intact for subscribers.
//! - **Structure before semantics**: a [`TransactionBody`] keeps its
//!   `events` collection optional so the gateway can tell a malformed
//!   delivery apart from an empty one.

pub mod entities;
pub mod transaction;

pub use entities::Event;
pub use transaction::{Transaction, TransactionBody, EPHEMERAL_EVENTS_KEY};
