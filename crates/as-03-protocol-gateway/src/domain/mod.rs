//! Domain types for the protocol gateway.

pub mod config;
pub mod error;
pub mod history;

pub use config::{ConfigError, GatewayConfig};
pub use error::{ApiError, ErrCode, GatewayError, Rejection};
pub use history::TxnHistory;
