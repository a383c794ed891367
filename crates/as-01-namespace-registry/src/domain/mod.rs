//! Domain Layer - namespace claims and matching
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod kind;
pub mod pattern;
pub mod registry;

pub use kind::NamespaceKind;
pub use pattern::{NamespacePattern, Namespaces};
pub use registry::NamespaceRegistry;
