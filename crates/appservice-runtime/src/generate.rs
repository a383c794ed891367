//! `generate` mode: write a fresh registration file.

use as_02_registration::{generate_token, AppServiceRegistration, RegistrationError};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

/// Build a registration with a random id and random tokens.
///
/// No namespaces are claimed; edit the file before handing it to the
/// homeserver.
pub fn new_registration(url: &str, sender_localpart: &str) -> AppServiceRegistration {
    let mut reg = AppServiceRegistration::new(Some(url.to_string()));
    reg.set_id(Uuid::new_v4().simple().to_string());
    reg.set_homeserver_token(generate_token());
    reg.set_app_service_token(generate_token());
    reg.set_sender_localpart(sender_localpart);
    reg
}

/// Generate a registration and write it to `path` as YAML.
pub fn generate(
    url: &str,
    sender_localpart: &str,
    path: impl AsRef<Path>,
) -> Result<AppServiceRegistration, RegistrationError> {
    let reg = new_registration(url, sender_localpart);
    reg.output_as_yaml(path.as_ref())?;
    info!(path = %path.as_ref().display(), url = %url, "Generated registration");
    Ok(reg)
}
