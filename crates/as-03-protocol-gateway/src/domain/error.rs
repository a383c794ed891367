//! Wire-level errors and gateway lifecycle errors.
//!
//! Structured errors use the `{errcode, error}` body shape. Malformed
//! requests are answered with a bare text message instead.

use crate::ports::ResolveError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code vocabulary of the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrCode {
    #[serde(rename = "M_FORBIDDEN")]
    Forbidden,
    #[serde(rename = "M_NOT_FOUND")]
    NotFound,
    #[serde(rename = "M_UNKNOWN")]
    Unknown,
    #[serde(rename = "M_BAD_JSON")]
    BadJson,
}

impl ErrCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forbidden => "M_FORBIDDEN",
            Self::NotFound => "M_NOT_FOUND",
            Self::Unknown => "M_UNKNOWN",
            Self::BadJson => "M_BAD_JSON",
        }
    }

    /// HTTP status used when this code is sent.
    pub const fn status(self) -> StatusCode {
        match self {
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadJson => StatusCode::BAD_REQUEST,
        }
    }
}

impl fmt::Display for ErrCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error returned to the coordinating server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub errcode: ErrCode,
    pub error: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ApiError {
    /// Create an error with the code's default status
    pub fn new(errcode: ErrCode, error: impl Into<String>) -> Self {
        Self {
            errcode,
            error: error.into(),
            status: errcode.status(),
        }
    }

    /// Bad or missing homeserver token
    pub fn forbidden() -> Self {
        Self::new(ErrCode::Forbidden, "Bad token supplied")
    }

    pub fn not_found(details: impl Into<String>) -> Self {
        Self::new(ErrCode::NotFound, details)
    }

    pub fn unknown(details: impl Into<String>) -> Self {
        Self::new(ErrCode::Unknown, details)
    }

    /// Map a resolver outcome for `what` ("User", "Alias") onto the wire.
    pub fn from_resolve(what: &str, err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound => Self::not_found(format!("{what} not found")),
            ResolveError::Failed(message) => Self::unknown(message),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.errcode, self.error)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Plain-text message for a transaction with no id.
pub const MISSING_TXN_ID: &str = "Missing transaction ID.";
/// Plain-text message for a transaction with no `events` array.
pub const MISSING_EVENTS: &str = "Missing events body.";
/// Plain-text message for a body that is not valid JSON.
pub const MALFORMED_JSON: &str = "Malformed JSON body.";

/// Every way a request can be refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Required structure missing; answered as text, not `{errcode, error}`.
    #[error("malformed request: {0}")]
    Malformed(&'static str),
}

impl Rejection {
    /// The structured error, if this is not a malformed-request rejection.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            Self::Malformed(_) => None,
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        match self {
            Self::Api(err) => err.into_response(),
            Self::Malformed(message) => (StatusCode::BAD_REQUEST, message).into_response(),
        }
    }
}

/// Gateway-level errors (server lifecycle, not sent on the wire)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(#[source] std::io::Error),

    /// `listen` called on a running server
    #[error("server already started")]
    AlreadyStarted,

    /// `close` called before `listen`
    #[error("Server has not started")]
    NotStarted,

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let json = serde_json::to_value(ApiError::forbidden()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"errcode": "M_FORBIDDEN", "error": "Bad token supplied"})
        );
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::unknown("backend down");
        assert_eq!(err.to_string(), "M_UNKNOWN: backend down");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_from_resolve() {
        let not_found = ApiError::from_resolve("User", ResolveError::NotFound);
        assert_eq!(not_found.errcode, ErrCode::NotFound);
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);

        let failed = ApiError::from_resolve("Alias", ResolveError::failed("db locked"));
        assert_eq!(failed.errcode, ErrCode::Unknown);
        assert_eq!(failed.error, "db locked");
    }

    #[test]
    fn test_rejection_status() {
        let malformed = Rejection::Malformed(MISSING_EVENTS).into_response();
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

        let forbidden = Rejection::from(ApiError::forbidden()).into_response();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
    }
}
