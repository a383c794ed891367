//! YAML file persistence.
//!
//! The file holds exactly the exported artifact, so it can be handed to the
//! coordinating server's operator unchanged.

use crate::domain::AppServiceRegistration;
use crate::error::RegistrationError;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::info;

impl AppServiceRegistration {
    /// Export the registration and write it to `path` as YAML.
    ///
    /// Fails with [`RegistrationError::MissingFields`] before touching the
    /// file if the record is incomplete.
    pub fn output_as_yaml(&self, path: impl AsRef<Path>) -> Result<(), RegistrationError> {
        let path = path.as_ref();
        let yaml = self.to_yaml()?;
        fs::write(path, yaml)?;
        info!(path = %path.display(), "Registration written");
        Ok(())
    }

    /// Export the registration as a YAML document.
    pub fn to_yaml(&self) -> Result<String, RegistrationError> {
        Ok(serde_yaml::to_string(&self.get_output()?)?)
    }

    /// Parse a YAML document into a registration.
    pub fn from_yaml(yaml: &str) -> Result<Self, RegistrationError> {
        let value: Value = serde_yaml::from_str(yaml)?;
        Self::from_object(&value).ok_or_else(|| {
            RegistrationError::InvalidObject("expected a mapping with a url key".to_string())
        })
    }

    /// Read a registration from a YAML file.
    pub fn load_yaml(path: impl AsRef<Path>) -> Result<Self, RegistrationError> {
        let path = path.as_ref();
        let reg = Self::from_yaml(&fs::read_to_string(path)?)?;
        info!(path = %path.display(), id = ?reg.id(), "Registration loaded");
        Ok(reg)
    }
}
