//! # AS-02 Registration
//!
//! The registration record that describes one appservice to the coordinating
//! server: its tokens, URL, sender identity, namespace claims and capability
//! flags.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`)
//!   - `AppServiceRegistration`: the mutable record, built up incrementally
//!   - `RegistrationOutput`: the exported artifact, only producible when every
//!     required field is set
//!   - `generate_token`: random hex secrets
//!
//! - **Adapters Layer** (`adapters/`)
//!   - YAML file persistence of the exported artifact
//!
//! ## Invariants
//!
//! - Export fails unless `id`, `hs_token`, `as_token` and `sender_localpart`
//!   are all set, and the error names every missing field.
//! - Optional keys are omitted from the artifact when unset. `url` is always
//!   present, `null` when unset.
//! - `from_object(export(r))` reproduces every field of `r` that was set.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod error;

pub use domain::{
    generate_token, AppServiceRegistration, RegistrationOutput, RequiredField,
    PUSH_EPHEMERAL_KEY,
};
pub use error::RegistrationError;

// Re-exported so callers need only this crate to add patterns.
pub use as_01_namespace_registry::{NamespaceError, NamespaceKind, NamespacePattern, Namespaces};
