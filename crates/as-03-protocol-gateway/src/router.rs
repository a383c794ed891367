//! HTTP routes for the three protocol operations.
//!
//! Handlers stay thin: extract the path segment, the token and the raw
//! body, then call into [`ProtocolGateway`].

use crate::domain::config::GatewayConfig;
use crate::domain::error::{Rejection, MALFORMED_JSON, MISSING_TXN_ID};
use crate::middleware::{AccessLogLayer, AccessToken};
use crate::service::ProtocolGateway;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use shared_types::TransactionBody;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

/// Path prefix of the versioned routes.
pub const API_PREFIX: &str = "/_matrix/app/v1";

/// Build the router for a gateway.
///
/// Versioned routes are always served; the unprefixed legacy routes only
/// when `config.legacy_routes` is set.
pub fn build_router(gateway: Arc<ProtocolGateway>, config: &GatewayConfig) -> Router {
    let mut router = Router::new().nest(API_PREFIX, protocol_routes());
    if config.legacy_routes {
        router = router.merge(protocol_routes());
    }

    router
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(AccessLogLayer::new())
        .with_state(gateway)
}

fn protocol_routes() -> Router<Arc<ProtocolGateway>> {
    Router::new()
        .route("/users/:user_id", get(query_user))
        .route("/rooms/:alias", get(query_alias))
        .route("/transactions/:txn_id", put(put_transaction))
        .route("/transactions/", put(put_transaction_without_id))
}

/// `{}`, the success body of every operation.
fn empty() -> Json<Value> {
    Json(json!({}))
}

async fn query_user(
    State(gateway): State<Arc<ProtocolGateway>>,
    Path(user_id): Path<String>,
    token: AccessToken,
) -> Result<Json<Value>, Rejection> {
    gateway.on_user_query(&user_id, token.as_deref()).await?;
    Ok(empty())
}

async fn query_alias(
    State(gateway): State<Arc<ProtocolGateway>>,
    Path(alias): Path<String>,
    token: AccessToken,
) -> Result<Json<Value>, Rejection> {
    gateway.on_alias_query(&alias, token.as_deref()).await?;
    Ok(empty())
}

async fn put_transaction(
    State(gateway): State<Arc<ProtocolGateway>>,
    Path(txn_id): Path<String>,
    token: AccessToken,
    body: Bytes,
) -> Result<Json<Value>, Rejection> {
    // A bad token must win over a bad body
    gateway.authenticate(token.as_deref())?;

    let body: TransactionBody = if body.is_empty() {
        TransactionBody::default()
    } else {
        serde_json::from_slice(&body).map_err(|_| Rejection::Malformed(MALFORMED_JSON))?
    };

    gateway
        .on_transaction(&txn_id, body, token.as_deref())
        .await?;
    Ok(empty())
}

async fn put_transaction_without_id(
    State(gateway): State<Arc<ProtocolGateway>>,
    token: AccessToken,
) -> Result<Json<Value>, Rejection> {
    gateway.authenticate(token.as_deref())?;
    Err(Rejection::Malformed(MISSING_TXN_ID))
}
