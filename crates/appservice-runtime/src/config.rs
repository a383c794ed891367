//! Runtime configuration from environment variables.

use as_03_protocol_gateway::GatewayConfig;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Default path of the registration file.
pub const DEFAULT_REGISTRATION_PATH: &str = "registration.yaml";

/// Default sender localpart for `generate`.
pub const DEFAULT_SENDER_LOCALPART: &str = "appservice";

/// Everything the runtime needs to start.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Registration YAML to load (or write, in `generate` mode)
    pub registration_path: PathBuf,

    /// Listener configuration. `homeserver_token` here overrides the
    /// registration's `hs_token`.
    pub gateway: GatewayConfig,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Sender localpart written by `generate`
    pub sender_localpart: String,

    /// Variables that were set but could not be parsed, as `(name, value)`.
    /// Logged once logging is up; the defaults are used instead.
    pub ignored: Vec<(String, String)>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            registration_path: PathBuf::from(DEFAULT_REGISTRATION_PATH),
            gateway: GatewayConfig::default(),
            log_level: "info".to_string(),
            json_logs: false,
            sender_localpart: DEFAULT_SENDER_LOCALPART.to_string(),
            ignored: Vec::new(),
        }
    }
}

impl RuntimeConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `AS_REGISTRATION`: Registration file (default: registration.yaml)
    /// - `AS_HOST`: Bind address (default: 0.0.0.0)
    /// - `AS_PORT`: Bind port (default: 8090)
    /// - `AS_MAX_BODY_BYTES`: Request body limit (default: 5000000)
    /// - `AS_LEGACY_ROUTES`: Serve unprefixed routes (default: true)
    /// - `AS_TXN_HISTORY`: Transaction ids remembered for replay detection (default: 1024)
    /// - `AS_HOMESERVER_TOKEN`: Overrides the registration's hs_token
    /// - `AS_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `AS_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `AS_SENDER_LOCALPART`: Localpart used by `generate` (default: appservice)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let mut ignored = Vec::new();

        let host = parse_with(&lookup, "AS_HOST", &mut ignored).unwrap_or(defaults.gateway.host);
        let port = parse_with(&lookup, "AS_PORT", &mut ignored).unwrap_or(defaults.gateway.port);
        let max_body_bytes = parse_with(&lookup, "AS_MAX_BODY_BYTES", &mut ignored)
            .unwrap_or(defaults.gateway.max_body_bytes);
        let txn_history = parse_with(&lookup, "AS_TXN_HISTORY", &mut ignored)
            .unwrap_or(defaults.gateway.txn_history);

        let legacy_routes = lookup("AS_LEGACY_ROUTES")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(defaults.gateway.legacy_routes);

        Self {
            registration_path: lookup("AS_REGISTRATION")
                .map(PathBuf::from)
                .unwrap_or(defaults.registration_path),

            gateway: GatewayConfig {
                host,
                port,
                max_body_bytes,
                legacy_routes,
                homeserver_token: lookup("AS_HOMESERVER_TOKEN").filter(|t| !t.is_empty()),
                txn_history,
            },

            log_level: lookup("AS_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            json_logs: lookup("AS_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.json_logs),

            sender_localpart: lookup("AS_SENDER_LOCALPART")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.sender_localpart),

            ignored,
        }
    }
}

fn parse_with<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    ignored: &mut Vec<(String, String)>,
) -> Option<T> {
    let raw = lookup(key).filter(|v| !v.is_empty())?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            ignored.push((key.to_string(), raw));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::from_lookup(lookup(&[]));
        assert_eq!(config.registration_path, PathBuf::from("registration.yaml"));
        assert_eq!(config.gateway, GatewayConfig::default());
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logs);
        assert_eq!(config.sender_localpart, "appservice");
        assert!(config.ignored.is_empty());
    }

    #[test]
    fn test_overrides() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("AS_REGISTRATION", "/etc/bridge/reg.yaml"),
            ("AS_HOST", "127.0.0.1"),
            ("AS_PORT", "9000"),
            ("AS_MAX_BODY_BYTES", "1024"),
            ("AS_LEGACY_ROUTES", "false"),
            ("AS_TXN_HISTORY", "16"),
            ("AS_HOMESERVER_TOKEN", "hs"),
            ("RUST_LOG", "debug"),
            ("AS_JSON_LOGS", "1"),
            ("AS_SENDER_LOCALPART", "ircbot"),
        ]));

        assert_eq!(config.registration_path, PathBuf::from("/etc/bridge/reg.yaml"));
        assert_eq!(config.gateway.bind_addr().to_string(), "127.0.0.1:9000");
        assert_eq!(config.gateway.max_body_bytes, 1024);
        assert!(!config.gateway.legacy_routes);
        assert_eq!(config.gateway.txn_history, 16);
        assert_eq!(config.gateway.homeserver_token.as_deref(), Some("hs"));
        assert_eq!(config.log_level, "debug");
        assert!(config.json_logs);
        assert_eq!(config.sender_localpart, "ircbot");
    }

    #[test]
    fn test_as_log_level_beats_rust_log() {
        let config =
            RuntimeConfig::from_lookup(lookup(&[("AS_LOG_LEVEL", "warn"), ("RUST_LOG", "trace")]));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("AS_HOST", "not-an-ip"),
            ("AS_PORT", "eighty"),
        ]));

        assert_eq!(config.gateway.host, GatewayConfig::default().host);
        assert_eq!(config.gateway.port, 8090);
        assert_eq!(config.ignored.len(), 2);
        assert!(config.ignored.contains(&("AS_PORT".to_string(), "eighty".to_string())));
    }
}
