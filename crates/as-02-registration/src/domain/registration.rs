//! The mutable registration record.

use super::output::{RegistrationOutput, RequiredField, PUSH_EPHEMERAL_KEY};
use crate::error::RegistrationError;
use as_01_namespace_registry::{NamespaceError, NamespaceKind, NamespaceRegistry};
use serde_json::{Map, Value};
use tracing::debug;

/// Identity and capability contract of one appservice.
///
/// Fields may be filled in any order; nothing is validated until
/// [`get_output`](Self::get_output).
///
/// # Example
///
/// ```
/// use as_02_registration::{AppServiceRegistration, NamespaceKind};
///
/// let mut reg = AppServiceRegistration::new(Some("http://localhost:8090".into()));
/// reg.set_id("irc-bridge");
/// reg.set_homeserver_token(as_02_registration::generate_token());
/// reg.set_app_service_token(as_02_registration::generate_token());
/// reg.set_sender_localpart("ircbot");
/// reg.add_regex_pattern(NamespaceKind::Users, "@irc_.+", true).unwrap();
///
/// let output = reg.get_output().unwrap();
/// assert_eq!(output.sender_localpart, "ircbot");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppServiceRegistration {
    id: Option<String>,
    hs_token: Option<String>,
    as_token: Option<String>,
    url: Option<String>,
    sender_localpart: Option<String>,
    rate_limited: Option<bool>,
    push_ephemeral: Option<bool>,
    protocols: Option<Vec<String>>,
    namespaces: NamespaceRegistry,
}

impl AppServiceRegistration {
    /// Create an empty registration, optionally with the appservice URL.
    pub fn new(url: Option<String>) -> Self {
        Self {
            url,
            ..Self::default()
        }
    }

    /// Rebuild a registration from its structured representation.
    ///
    /// Returns `None` when `obj` is not an object, has no `url` key, or
    /// carries a namespace entry that cannot be inserted. `url: null` is
    /// accepted.
    pub fn from_object(obj: &Value) -> Option<Self> {
        let map = obj.as_object()?;
        if !map.contains_key("url") {
            debug!("Registration object has no url key");
            return None;
        }

        let mut reg = Self::new(string_field(map, "url"));
        reg.id = string_field(map, "id");
        reg.hs_token = string_field(map, "hs_token");
        reg.as_token = string_field(map, "as_token");
        reg.sender_localpart = string_field(map, "sender_localpart");
        reg.rate_limited = map.get("rate_limited").and_then(Value::as_bool);
        reg.push_ephemeral = map.get(PUSH_EPHEMERAL_KEY).and_then(Value::as_bool);
        reg.protocols = map.get("protocols").and_then(|v| {
            v.as_array()?
                .iter()
                .map(|p| p.as_str().map(str::to_string))
                .collect()
        });

        if let Some(namespaces) = map.get("namespaces").and_then(Value::as_object) {
            for kind in NamespaceKind::ALL {
                let Some(entries) = namespaces.get(kind.as_str()).and_then(Value::as_array) else {
                    continue;
                };
                for entry in entries {
                    let regex = entry.get("regex").and_then(Value::as_str)?;
                    let exclusive = entry
                        .get("exclusive")
                        .and_then(Value::as_bool)
                        .unwrap_or(false);
                    if let Err(e) = reg.add_regex_pattern(kind, regex, exclusive) {
                        debug!(error = %e, "Registration object has an invalid namespace");
                        return None;
                    }
                }
            }
        }

        Some(reg)
    }

    /// Export the artifact.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::MissingFields`] naming every required field that
    /// is unset or empty.
    pub fn get_output(&self) -> Result<RegistrationOutput, RegistrationError> {
        let missing: Vec<RequiredField> = RequiredField::ALL
            .into_iter()
            .filter(|field| self.required(*field).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(RegistrationError::MissingFields(missing));
        }

        let required = |field| self.required(field).unwrap_or_default().to_string();
        let namespaces = (!self.namespaces.is_empty()).then(|| self.namespaces.to_namespaces());

        Ok(RegistrationOutput {
            id: required(RequiredField::Id),
            hs_token: required(RequiredField::HsToken),
            as_token: required(RequiredField::AsToken),
            url: self.url.clone(),
            sender_localpart: required(RequiredField::SenderLocalpart),
            protocols: self.protocols.clone(),
            push_ephemeral: self.push_ephemeral,
            rate_limited: self.rate_limited,
            namespaces,
        })
    }

    /// [`get_output`](Self::get_output) as a JSON value.
    pub fn export(&self) -> Result<Value, RegistrationError> {
        Ok(serde_json::to_value(self.get_output()?)?)
    }

    fn required(&self, field: RequiredField) -> Option<&str> {
        let value = match field {
            RequiredField::Id => &self.id,
            RequiredField::HsToken => &self.hs_token,
            RequiredField::AsToken => &self.as_token,
            RequiredField::SenderLocalpart => &self.sender_localpart,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    // Namespaces

    /// Claim a namespace pattern.
    pub fn add_regex_pattern(
        &mut self,
        kind: NamespaceKind,
        regex: &str,
        exclusive: bool,
    ) -> Result<(), NamespaceError> {
        self.namespaces.add_pattern(kind, regex, exclusive)
    }

    /// Claim a namespace pattern with the kind given as text.
    pub fn add_regex_pattern_str(
        &mut self,
        kind: &str,
        regex: &str,
        exclusive: bool,
    ) -> Result<(), NamespaceError> {
        self.namespaces.add_pattern_str(kind, regex, exclusive)
    }

    pub fn is_user_match(&self, user_id: &str, only_exclusive: bool) -> bool {
        self.namespaces
            .matches(NamespaceKind::Users, user_id, only_exclusive)
    }

    pub fn is_alias_match(&self, alias: &str, only_exclusive: bool) -> bool {
        self.namespaces
            .matches(NamespaceKind::Aliases, alias, only_exclusive)
    }

    pub fn is_room_match(&self, room_id: &str, only_exclusive: bool) -> bool {
        self.namespaces
            .matches(NamespaceKind::Rooms, room_id, only_exclusive)
    }

    pub fn namespaces(&self) -> &NamespaceRegistry {
        &self.namespaces
    }

    // Accessors

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Set the id. It must be unique on the coordinating server and never change.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn homeserver_token(&self) -> Option<&str> {
        self.hs_token.as_deref()
    }

    /// Set the token the coordinating server presents on inbound requests.
    pub fn set_homeserver_token(&mut self, token: impl Into<String>) {
        self.hs_token = Some(token.into());
    }

    pub fn app_service_token(&self) -> Option<&str> {
        self.as_token.as_deref()
    }

    /// Set the token this appservice presents on outbound requests.
    pub fn set_app_service_token(&mut self, token: impl Into<String>) {
        self.as_token = Some(token.into());
    }

    pub fn app_service_url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn set_app_service_url(&mut self, url: impl Into<String>) {
        self.url = Some(url.into());
    }

    pub fn sender_localpart(&self) -> Option<&str> {
        self.sender_localpart.as_deref()
    }

    /// Set the localpart of the appservice's own user (`alice` in `@alice:domain`).
    pub fn set_sender_localpart(&mut self, localpart: impl Into<String>) {
        self.sender_localpart = Some(localpart.into());
    }

    /// Whether the coordinating server rate-limits this appservice.
    ///
    /// Defaults to `true` when never set.
    pub fn is_rate_limited(&self) -> bool {
        self.rate_limited.unwrap_or(true)
    }

    pub fn set_rate_limited(&mut self, rate_limited: bool) {
        self.rate_limited = Some(rate_limited);
    }

    /// Whether this appservice asks for ephemeral events. `None` when unset.
    pub fn push_ephemeral(&self) -> Option<bool> {
        self.push_ephemeral
    }

    pub fn set_push_ephemeral(&mut self, push_ephemeral: bool) {
        self.push_ephemeral = Some(push_ephemeral);
    }

    /// Third-party protocols served for lookups. `None` when unset.
    pub fn protocols(&self) -> Option<&[String]> {
        self.protocols.as_deref()
    }

    pub fn set_protocols(&mut self, protocols: Vec<String>) {
        self.protocols = Some(protocols);
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}
