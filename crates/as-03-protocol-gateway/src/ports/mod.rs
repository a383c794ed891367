//! Ports Layer - trait seams for caller-supplied behavior

pub mod inbound;

pub use inbound::{resolver_fn, FnResolver, QueryResolver, ResolveError};
