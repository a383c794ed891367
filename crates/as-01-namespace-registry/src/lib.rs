//! # AS-01 Namespace Registry
//!
//! Decides whether an identifier is claimed by this appservice.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): pure data and matching, no I/O
//!   - `NamespaceKind`: `users`, `aliases` or `rooms`
//!   - `NamespacePattern`: a regex source plus its exclusivity flag
//!   - `Namespaces`: the serialized form of all three pattern lists
//!   - `NamespaceRegistry`: ordered pattern lists with a compiled-regex cache
//!
//! ## Invariants
//!
//! - Patterns are evaluated in insertion order and the first match wins.
//! - A pattern's regex is compiled once, at insertion, and cached by its
//!   source text. Matching never compiles and cannot fail.
//! - A kind with no patterns matches nothing.
//!
//! ## Usage Example
//!
//! ```
//! use as_01_namespace_registry::{NamespaceKind, NamespaceRegistry};
//!
//! let mut registry = NamespaceRegistry::new();
//! registry.add_pattern(NamespaceKind::Users, "@irc_.+", true).unwrap();
//!
//! assert!(registry.matches(NamespaceKind::Users, "@irc_alice:example.org", true));
//! assert!(!registry.matches(NamespaceKind::Rooms, "!abc:example.org", false));
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod domain;
pub mod error;

pub use domain::{NamespaceKind, NamespacePattern, NamespaceRegistry, Namespaces};
pub use error::NamespaceError;
