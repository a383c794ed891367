//! Namespace pattern value types.

use super::NamespaceKind;
use serde::{Deserialize, Serialize};

/// One namespace claim: a regex source and whether it is exclusive.
///
/// An exclusive claim reserves every matching identifier for this
/// appservice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespacePattern {
    pub regex: String,
    pub exclusive: bool,
}

impl NamespacePattern {
    pub fn new(regex: impl Into<String>, exclusive: bool) -> Self {
        Self {
            regex: regex.into(),
            exclusive,
        }
    }
}

/// Serialized form of a registry: `{users: [...], aliases: [...], rooms: [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Namespaces {
    pub users: Vec<NamespacePattern>,
    pub aliases: Vec<NamespacePattern>,
    pub rooms: Vec<NamespacePattern>,
}

impl Namespaces {
    pub fn get(&self, kind: NamespaceKind) -> &[NamespacePattern] {
        match kind {
            NamespaceKind::Users => &self.users,
            NamespaceKind::Aliases => &self.aliases,
            NamespaceKind::Rooms => &self.rooms,
        }
    }

    /// True when no kind has any pattern.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.aliases.is_empty() && self.rooms.is_empty()
    }
}
