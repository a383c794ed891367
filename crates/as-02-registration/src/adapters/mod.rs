//! Adapters Layer - persistence of the registration artifact

pub mod yaml;
