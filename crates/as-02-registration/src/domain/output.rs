//! The exported registration artifact.

use as_01_namespace_registry::Namespaces;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Artifact key of the ephemeral-push capability flag.
pub const PUSH_EPHEMERAL_KEY: &str = "de.sorunome.msc2409.push_ephemeral";

/// Fields that must be set before a registration can be exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    Id,
    HsToken,
    AsToken,
    SenderLocalpart,
}

impl RequiredField {
    pub const ALL: [RequiredField; 4] = [
        Self::Id,
        Self::HsToken,
        Self::AsToken,
        Self::SenderLocalpart,
    ];

    /// Key of the field in the artifact.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::HsToken => "hs_token",
            Self::AsToken => "as_token",
            Self::SenderLocalpart => "sender_localpart",
        }
    }

    pub(crate) fn join(fields: &[RequiredField]) -> String {
        fields
            .iter()
            .map(|f| f.key())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Registration artifact as written to disk and sent to the coordinating
/// server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationOutput {
    pub id: String,
    pub hs_token: String,
    pub as_token: String,
    /// Serialized as `null` when unset.
    pub url: Option<String>,
    pub sender_localpart: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocols: Option<Vec<String>>,
    #[serde(
        rename = "de.sorunome.msc2409.push_ephemeral",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub push_ephemeral: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limited: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespaces: Option<Namespaces>,
}
