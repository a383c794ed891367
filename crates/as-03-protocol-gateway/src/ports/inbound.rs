//! Inbound ports: resolvers for identity and alias existence queries.
//!
//! The gateway never decides on its own whether a user or alias exists. It
//! asks one resolver per kind and maps the outcome onto the wire contract.

use async_trait::async_trait;
use std::future::Future;
use thiserror::Error;

/// Why a resolver could not confirm an identifier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The identifier is not backed by anything. Surfaced as `M_NOT_FOUND`.
    #[error("not found")]
    NotFound,

    /// The resolver hit an unexpected condition. Surfaced as `M_UNKNOWN`
    /// carrying the message.
    #[error("{0}")]
    Failed(String),
}

impl ResolveError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Decides whether this appservice recognizes an identifier.
///
/// On success the resolver may have created whatever backs the identifier
/// (a puppet user, a portal room); that is outside the gateway's concern.
#[async_trait]
pub trait QueryResolver: Send + Sync {
    async fn resolve(&self, id: &str) -> Result<(), ResolveError>;
}

/// Adapter turning an async closure into a [`QueryResolver`].
pub struct FnResolver<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> QueryResolver for FnResolver<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ResolveError>> + Send + 'static,
{
    async fn resolve(&self, id: &str) -> Result<(), ResolveError> {
        (self.f)(id.to_string()).await
    }
}

/// Wrap an async closure as a resolver.
///
/// ```
/// use as_03_protocol_gateway::{resolver_fn, ResolveError};
///
/// let resolver = resolver_fn(|user_id: String| async move {
///     if user_id.starts_with("@irc_") {
///         Ok(())
///     } else {
///         Err(ResolveError::NotFound)
///     }
/// });
/// # let _ = resolver;
/// ```
pub fn resolver_fn<F, Fut>(f: F) -> FnResolver<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ResolveError>> + Send + 'static,
{
    FnResolver { f }
}
