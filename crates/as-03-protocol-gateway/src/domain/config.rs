//! Gateway configuration with validation.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Default cap on request body size, in bytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 5_000_000;

/// Default number of recently processed transaction ids kept for replay
/// detection.
pub const DEFAULT_TXN_HISTORY: usize = 1024;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8090;

/// HTTP listener and protocol configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Bind address
    pub host: IpAddr,
    /// Bind port (0 picks a free port)
    pub port: u16,
    /// Largest accepted request body
    pub max_body_bytes: usize,
    /// Also serve the unprefixed `/users`, `/rooms`, `/transactions` routes
    pub legacy_routes: bool,
    /// Secret the coordinating server presents on every request
    pub homeserver_token: Option<String>,
    /// How many recent transaction ids are remembered as already processed
    pub txn_history: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            legacy_routes: true,
            homeserver_token: None,
            txn_history: DEFAULT_TXN_HISTORY,
        }
    }
}

impl GatewayConfig {
    /// Configuration with the given homeserver token and defaults elsewhere.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            homeserver_token: Some(token.into()),
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_body_bytes cannot be 0".into(),
            ));
        }
        if self.txn_history == 0 {
            return Err(ConfigError::InvalidLimit("txn_history cannot be 0".into()));
        }

        match self.homeserver_token.as_deref() {
            None | Some("") => Err(ConfigError::MissingToken),
            Some(_) => Ok(()),
        }
    }

    /// Get HTTP server bind address
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No homeserver token to authenticate requests against
    #[error("homeserver token must be set")]
    MissingToken,
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
}
