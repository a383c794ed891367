//! # Transactions
//!
//! One delivery batch from the coordinating server.

use crate::entities::Event;
use serde::{Deserialize, Serialize};

/// Body key carrying ephemeral events alongside ordinary ones.
pub const EPHEMERAL_EVENTS_KEY: &str = "de.sorunome.msc2409.ephemeral";

/// The JSON body of a `PUT /transactions/:txnId` request.
///
/// `events` stays optional: its absence is a malformed request, which is a
/// different outcome from an empty batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionBody {
    /// Ordinary events, in delivery order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<Event>>,

    /// Ephemeral events (typing, receipts, presence), in delivery order.
    #[serde(
        default,
        rename = "de.sorunome.msc2409.ephemeral",
        alias = "ephemeral",
        skip_serializing_if = "Option::is_none"
    )]
    pub ephemeral: Option<Vec<Event>>,
}

impl TransactionBody {
    /// Body carrying only ordinary events.
    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            events: Some(events),
            ephemeral: None,
        }
    }
}

/// A structurally valid transaction, ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Caller-chosen id used for de-duplication.
    pub txn_id: String,
    /// Ordinary events.
    pub events: Vec<Event>,
    /// Ephemeral events.
    pub ephemeral: Vec<Event>,
}

impl Transaction {
    /// Accept a body delivered under `txn_id`.
    ///
    /// Returns `None` when the body has no `events` collection. A missing
    /// ephemeral collection is treated as empty.
    pub fn from_body(txn_id: impl Into<String>, body: TransactionBody) -> Option<Self> {
        Some(Self {
            txn_id: txn_id.into(),
            events: body.events?,
            ephemeral: body.ephemeral.unwrap_or_default(),
        })
    }

    /// Total number of events carried, ordinary and ephemeral.
    pub fn len(&self) -> usize {
        self.events.len() + self.ephemeral.len()
    }

    /// Whether the transaction carries no events at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
