#![allow(missing_docs)]

//! AS-03 Protocol Gateway - the inbound half of the appservice protocol.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                  PROTOCOL GATEWAY (as-03)                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  GET /users/:userId   GET /rooms/:alias   PUT /transactions/:id │
//! │        (also under /_matrix/app/v1)                            │
//! │                          │                                     │
//! │  ┌───────────────────────┴──────────────────────┐              │
//! │  │        Middleware: AccessLog → BodyLimit     │              │
//! │  └───────────────────────┬──────────────────────┘              │
//! │                          │                                     │
//! │  ┌───────────────────────┴──────────────────────┐              │
//! │  │               ProtocolGateway                │              │
//! │  │  token check → structure → replay → dispatch │              │
//! │  └───────┬──────────────────────────┬───────────┘              │
//! └──────────┼──────────────────────────┼──────────────────────────┘
//!            │                          │
//!     QueryResolver (users,       EventDispatcher
//!          aliases)              (shared-bus channels)
//! ```
//!
//! # Wire contract
//!
//! - Success bodies are `{}`.
//! - Errors are `{errcode, error}` with `M_FORBIDDEN` (403), `M_NOT_FOUND`
//!   (404) or `M_UNKNOWN` (500).
//! - Malformed transactions get a plain-text message and status 400.
//!
//! # Usage
//!
//! ```ignore
//! use as_03_protocol_gateway::{AppserviceServer, GatewayConfig, ProtocolGateway};
//!
//! let config = GatewayConfig::with_token(hs_token);
//! let gateway = ProtocolGateway::from_config(&config, bus)?.with_user_resolver(users);
//! let mut server = AppserviceServer::new(config, Arc::new(gateway))?;
//! let addr = server.listen().await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod middleware;
pub mod ports;
pub mod router;
pub mod server;
pub mod service;

// Re-exports for public API
pub use domain::config::GatewayConfig;
pub use domain::history::TxnHistory;
pub use domain::error::{ApiError, ErrCode, GatewayError, Rejection};
pub use ports::{resolver_fn, QueryResolver, ResolveError};
pub use router::{build_router, API_PREFIX};
pub use server::AppserviceServer;
pub use service::{ProtocolGateway, TransactionOutcome};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
