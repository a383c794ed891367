//! Error types for the registration record

use crate::domain::RequiredField;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Export attempted before every required field was set.
    #[error("Missing required field(s): {}", RequiredField::join(.0))]
    MissingFields(Vec<RequiredField>),

    /// The loaded document cannot be coerced into a registration.
    #[error("Not a registration object: {0}")]
    InvalidObject(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RegistrationError {
    /// The missing fields, if this is a validation failure.
    pub fn missing_fields(&self) -> &[RequiredField] {
        match self {
            Self::MissingFields(fields) => fields,
            _ => &[],
        }
    }
}
