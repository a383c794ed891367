//! Middleware and extractors for the HTTP surface.
//!
//! Layer order: Request → AccessLog → BodyLimit → Handler

pub mod access_log;
pub mod auth;

pub use access_log::{redact_query, AccessLogLayer};
pub use auth::{constant_time_compare, AccessToken};
