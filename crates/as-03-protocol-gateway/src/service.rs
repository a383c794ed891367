//! Protocol gateway - the inbound request state machine.
//!
//! Independent of the HTTP framework: the router in [`crate::router`] only
//! extracts path, token and body and hands them here.

use crate::domain::config::{ConfigError, GatewayConfig, DEFAULT_TXN_HISTORY};
use crate::domain::error::{ApiError, Rejection, MISSING_EVENTS, MISSING_TXN_ID};
use crate::domain::history::TxnHistory;
use crate::middleware::constant_time_compare;
use crate::ports::QueryResolver;
use as_01_namespace_registry::{NamespaceKind, NamespaceRegistry};
use parking_lot::RwLock;
use shared_bus::{Channel, EventDispatcher};
use shared_types::{Event, Transaction, TransactionBody};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Result of an accepted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionOutcome {
    /// Events were dispatched and the id was recorded.
    Processed { events: usize, ephemeral: usize },
    /// The id was processed recently; nothing was dispatched.
    Replayed,
}

/// Authenticates inbound requests, deduplicates transactions and fans
/// events out to the dispatcher.
///
/// # Example
///
/// ```
/// use as_03_protocol_gateway::{ProtocolGateway, TransactionOutcome};
/// use shared_bus::InMemoryEventBus;
/// use shared_types::{Event, TransactionBody};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() {
/// let gateway = ProtocolGateway::new("secret", Arc::new(InMemoryEventBus::new()));
/// let body = TransactionBody::with_events(vec![Event::new(serde_json::json!({"type": "m.room.message"}))]);
///
/// let outcome = gateway.on_transaction("t1", body.clone(), Some("secret")).await.unwrap();
/// assert_eq!(outcome, TransactionOutcome::Processed { events: 1, ephemeral: 0 });
///
/// let replay = gateway.on_transaction("t1", body, Some("secret")).await.unwrap();
/// assert_eq!(replay, TransactionOutcome::Replayed);
/// # }
/// ```
pub struct ProtocolGateway {
    homeserver_token: RwLock<String>,
    processed: Mutex<TxnHistory>,
    user_resolver: Option<Arc<dyn QueryResolver>>,
    alias_resolver: Option<Arc<dyn QueryResolver>>,
    namespaces: Option<NamespaceRegistry>,
    dispatcher: Arc<dyn EventDispatcher>,
}

impl ProtocolGateway {
    /// Create a gateway expecting `homeserver_token` on every request.
    pub fn new(homeserver_token: impl Into<String>, dispatcher: Arc<dyn EventDispatcher>) -> Self {
        Self {
            homeserver_token: RwLock::new(homeserver_token.into()),
            processed: Mutex::new(TxnHistory::new(DEFAULT_TXN_HISTORY)),
            user_resolver: None,
            alias_resolver: None,
            namespaces: None,
            dispatcher,
        }
    }

    /// Create a gateway from validated configuration.
    pub fn from_config(
        config: &GatewayConfig,
        dispatcher: Arc<dyn EventDispatcher>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let token = config.homeserver_token.clone().unwrap_or_default();
        Ok(Self::new(token, dispatcher).with_txn_history(config.txn_history))
    }

    /// Remember the last `capacity` processed transaction ids.
    ///
    /// A replay of any of them dispatches nothing. Ids older than that are
    /// forgotten and would be processed again.
    pub fn with_txn_history(mut self, capacity: usize) -> Self {
        self.processed = Mutex::new(TxnHistory::new(capacity));
        self
    }

    /// Resolver consulted by [`on_user_query`](Self::on_user_query).
    pub fn with_user_resolver(mut self, resolver: impl QueryResolver + 'static) -> Self {
        self.user_resolver = Some(Arc::new(resolver));
        self
    }

    /// Resolver consulted by [`on_alias_query`](Self::on_alias_query).
    pub fn with_alias_resolver(mut self, resolver: impl QueryResolver + 'static) -> Self {
        self.alias_resolver = Some(Arc::new(resolver));
        self
    }

    /// Only pass queries for claimed identifiers to the resolvers.
    ///
    /// Users and aliases outside every namespace are answered `M_NOT_FOUND`
    /// without consulting a resolver.
    pub fn with_namespaces(mut self, namespaces: NamespaceRegistry) -> Self {
        self.namespaces = Some(namespaces);
        self
    }

    /// Replace the expected homeserver token.
    pub fn set_homeserver_token(&self, token: impl Into<String>) {
        *self.homeserver_token.write() = token.into();
        info!("Homeserver token replaced");
    }

    /// Id of the last transaction that was dispatched, if any.
    pub async fn last_processed_txn_id(&self) -> Option<String> {
        self.processed.lock().await.newest().map(str::to_string)
    }

    /// The dispatcher events are published to.
    pub fn dispatcher(&self) -> &Arc<dyn EventDispatcher> {
        &self.dispatcher
    }

    /// Check a supplied token against the homeserver token.
    ///
    /// An absent token never matches.
    pub fn authenticate(&self, supplied: Option<&str>) -> Result<(), ApiError> {
        let expected = self.homeserver_token.read();
        match supplied {
            Some(token) if constant_time_compare(token, &expected) => Ok(()),
            _ => {
                warn!(token_present = supplied.is_some(), "Rejected request with bad token");
                Err(ApiError::forbidden())
            }
        }
    }

    /// Does this appservice recognize `user_id`?
    pub async fn on_user_query(&self, user_id: &str, token: Option<&str>) -> Result<(), ApiError> {
        self.authenticate(token)?;
        self.query(
            "User",
            NamespaceKind::Users,
            self.user_resolver.as_deref(),
            user_id,
        )
        .await
    }

    /// Does this appservice recognize the room alias `alias`?
    pub async fn on_alias_query(&self, alias: &str, token: Option<&str>) -> Result<(), ApiError> {
        self.authenticate(token)?;
        self.query(
            "Alias",
            NamespaceKind::Aliases,
            self.alias_resolver.as_deref(),
            alias,
        )
        .await
    }

    async fn query(
        &self,
        what: &str,
        kind: NamespaceKind,
        resolver: Option<&dyn QueryResolver>,
        id: &str,
    ) -> Result<(), ApiError> {
        let Some(resolver) = resolver else {
            debug!(kind = %kind, id, "No resolver registered");
            return Err(ApiError::not_found(format!("{what} not found")));
        };

        if let Some(namespaces) = &self.namespaces {
            if !namespaces.matches(kind, id, false) {
                debug!(kind = %kind, id, "Query outside claimed namespaces");
                return Err(ApiError::not_found(format!("{what} not found")));
            }
        }

        match resolver.resolve(id).await {
            Ok(()) => {
                debug!(kind = %kind, id, "Query resolved");
                Ok(())
            }
            Err(e) => {
                debug!(kind = %kind, id, error = %e, "Query rejected by resolver");
                Err(ApiError::from_resolve(what, e))
            }
        }
    }

    /// Accept one transaction.
    ///
    /// Order of checks: token, transaction id, events array, replay. A fresh
    /// transaction has every ordinary event published (generic channel,
    /// then its type channel), then every ephemeral event, before its id is
    /// recorded. The idempotence state stays locked for the whole call, so
    /// concurrent transactions are processed one at a time.
    pub async fn on_transaction(
        &self,
        txn_id: &str,
        body: TransactionBody,
        token: Option<&str>,
    ) -> Result<TransactionOutcome, Rejection> {
        self.authenticate(token)?;

        if txn_id.is_empty() {
            return Err(Rejection::Malformed(MISSING_TXN_ID));
        }
        let Some(txn) = Transaction::from_body(txn_id, body) else {
            return Err(Rejection::Malformed(MISSING_EVENTS));
        };

        let mut processed = self.processed.lock().await;
        if processed.contains(&txn.txn_id) {
            info!(txn_id, "Duplicate transaction, skipping dispatch");
            return Ok(TransactionOutcome::Replayed);
        }

        self.dispatch(&txn).await;

        info!(
            txn_id,
            events = txn.events.len(),
            ephemeral = txn.ephemeral.len(),
            "Transaction processed"
        );
        let outcome = TransactionOutcome::Processed {
            events: txn.events.len(),
            ephemeral: txn.ephemeral.len(),
        };
        processed.record(txn.txn_id);
        Ok(outcome)
    }

    async fn dispatch(&self, txn: &Transaction) {
        for event in &txn.events {
            self.publish(Channel::for_event(event), event).await;
        }
        for event in &txn.ephemeral {
            self.publish(Channel::for_ephemeral(event), event).await;
        }
    }

    async fn publish(&self, channels: Vec<Channel>, event: &Event) {
        for channel in &channels {
            self.dispatcher.publish(channel, event).await;
        }
    }
}
