//! # Channels
//!
//! Topic keys used to route events to subscribers.

use shared_types::Event;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const EVENT: &str = "event";
const TYPE_PREFIX: &str = "type:";
const EPHEMERAL: &str = "ephemeral";
const EPHEMERAL_TYPE_PREFIX: &str = "ephemeral_type:";

/// A dispatch channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Every ordinary event.
    Event,
    /// Ordinary events declaring the given type.
    Type(String),
    /// Every ephemeral event.
    Ephemeral,
    /// Ephemeral events declaring the given type.
    EphemeralType(String),
}

impl Channel {
    /// Channel for ordinary events of type `event_type`.
    pub fn of_type(event_type: impl Into<String>) -> Self {
        Self::Type(event_type.into())
    }

    /// Channel for ephemeral events of type `event_type`.
    pub fn of_ephemeral_type(event_type: impl Into<String>) -> Self {
        Self::EphemeralType(event_type.into())
    }

    /// Channels an ordinary event is published on, generic channel first.
    pub fn for_event(event: &Event) -> Vec<Channel> {
        let mut channels = vec![Self::Event];
        if let Some(t) = event.event_type() {
            channels.push(Self::of_type(t));
        }
        channels
    }

    /// Channels an ephemeral event is published on, generic channel first.
    pub fn for_ephemeral(event: &Event) -> Vec<Channel> {
        let mut channels = vec![Self::Ephemeral];
        if let Some(t) = event.event_type() {
            channels.push(Self::of_ephemeral_type(t));
        }
        channels
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Event => f.write_str(EVENT),
            Self::Type(t) => write!(f, "{TYPE_PREFIX}{t}"),
            Self::Ephemeral => f.write_str(EPHEMERAL),
            Self::EphemeralType(t) => write!(f, "{EPHEMERAL_TYPE_PREFIX}{t}"),
        }
    }
}

/// A channel name that does not follow the naming scheme.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized channel name: {0:?}")]
pub struct ChannelParseError(pub String);

impl FromStr for Channel {
    type Err = ChannelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == EVENT {
            return Ok(Self::Event);
        }
        if s == EPHEMERAL {
            return Ok(Self::Ephemeral);
        }
        if let Some(t) = s.strip_prefix(TYPE_PREFIX).filter(|t| !t.is_empty()) {
            return Ok(Self::of_type(t));
        }
        if let Some(t) = s.strip_prefix(EPHEMERAL_TYPE_PREFIX).filter(|t| !t.is_empty()) {
            return Ok(Self::of_ephemeral_type(t));
        }
        Err(ChannelParseError(s.to_string()))
    }
}
