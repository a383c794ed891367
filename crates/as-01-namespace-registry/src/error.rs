//! Error types for the namespace registry

use crate::domain::NamespaceKind;
use thiserror::Error;

/// Errors raised when a namespace pattern is inserted.
///
/// Matching itself never fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NamespaceError {
    #[error("Unknown namespace kind: {0:?} (expected users, aliases or rooms)")]
    UnknownKind(String),

    #[error("Empty regex for {kind} namespace")]
    EmptyPattern { kind: NamespaceKind },

    #[error("Invalid regex {pattern:?} for {kind} namespace: {reason}")]
    InvalidRegex {
        kind: NamespaceKind,
        pattern: String,
        reason: String,
    },
}
