//! The three identifier classes a namespace can claim.

use crate::error::NamespaceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespaceKind {
    /// User identifiers, e.g. `@alice:example.org`.
    Users,
    /// Room aliases, e.g. `#lobby:example.org`.
    Aliases,
    /// Room identifiers, e.g. `!abcdef:example.org`.
    Rooms,
}

impl NamespaceKind {
    /// All kinds, in serialization order.
    pub const ALL: [NamespaceKind; 3] = [Self::Users, Self::Aliases, Self::Rooms];

    /// The key used for this kind in the registration artifact.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Aliases => "aliases",
            Self::Rooms => "rooms",
        }
    }
}

impl fmt::Display for NamespaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamespaceKind {
    type Err = NamespaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "users" => Ok(Self::Users),
            "aliases" => Ok(Self::Aliases),
            "rooms" => Ok(Self::Rooms),
            other => Err(NamespaceError::UnknownKind(other.to_string())),
        }
    }
}
