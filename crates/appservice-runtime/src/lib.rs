//! # Appservice Runtime
//!
//! Loads a registration file and serves the appservice HTTP API for it.
//!
//! ```text
//! registration.yaml ──► AppServiceRegistration ──► namespaces, hs_token
//!                                                        │
//!                         ┌──────────────────────────────┘
//!                         ▼
//!   HTTP ──► AppserviceServer ──► ProtocolGateway ──► InMemoryEventBus ──► handlers
//! ```

pub mod config;
pub mod generate;
pub mod handlers;
pub mod logging;

pub use config::RuntimeConfig;
pub use generate::{generate, new_registration};
pub use handlers::{ClaimedNamespaceResolver, LoggingEventHandler};
pub use logging::{init_logging, LoggingError};

use as_02_registration::{AppServiceRegistration, RegistrationError};
use as_03_protocol_gateway::{AppserviceServer, GatewayError, ProtocolGateway};
use shared_bus::{Channel, EventDispatcher, InMemoryEventBus};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors from starting or stopping the runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    #[error("Registration has no hs_token and AS_HOMESERVER_TOKEN is unset")]
    MissingHomeserverToken,

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// The wired runtime: bus, gateway and server.
pub struct AppserviceRuntime {
    registration: AppServiceRegistration,
    bus: Arc<InMemoryEventBus>,
    server: AppserviceServer,
}

impl AppserviceRuntime {
    /// Load the registration from `config.registration_path` and wire it up.
    pub fn load(config: &RuntimeConfig) -> Result<Self, RuntimeError> {
        let registration = AppServiceRegistration::load_yaml(&config.registration_path)?;
        Self::from_registration(config, registration)
    }

    /// Wire a runtime around an already loaded registration.
    ///
    /// `config.gateway.homeserver_token` overrides the registration's.
    pub fn from_registration(
        config: &RuntimeConfig,
        registration: AppServiceRegistration,
    ) -> Result<Self, RuntimeError> {
        let token = config
            .gateway
            .homeserver_token
            .clone()
            .or_else(|| registration.homeserver_token().map(str::to_string))
            .ok_or(RuntimeError::MissingHomeserverToken)?;

        let bus = Arc::new(InMemoryEventBus::new());
        bus.subscribe_handler(Channel::Event, LoggingEventHandler::new("event"));
        bus.subscribe_handler(Channel::Ephemeral, LoggingEventHandler::new("ephemeral"));

        let gateway = ProtocolGateway::new(token.clone(), bus.clone())
            .with_user_resolver(ClaimedNamespaceResolver)
            .with_alias_resolver(ClaimedNamespaceResolver)
            .with_namespaces(registration.namespaces().clone());

        let mut gateway_config = config.gateway.clone();
        gateway_config.homeserver_token = Some(token);
        let server = AppserviceServer::new(gateway_config, Arc::new(gateway))?;

        Ok(Self {
            registration,
            bus,
            server,
        })
    }

    pub fn registration(&self) -> &AppServiceRegistration {
        &self.registration
    }

    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    pub fn gateway(&self) -> &Arc<ProtocolGateway> {
        self.server.gateway()
    }

    /// Start serving; returns the bound address.
    pub async fn start(&mut self) -> Result<SocketAddr, RuntimeError> {
        let addr = self.server.listen().await?;
        info!(
            addr = %addr,
            id = self.registration.id().unwrap_or("-"),
            "Appservice runtime started"
        );
        Ok(addr)
    }

    /// Stop serving and wait for in-flight requests.
    pub async fn stop(&mut self) -> Result<(), RuntimeError> {
        self.server.close().await?;
        info!(
            events_published = self.bus.events_published(),
            handler_failures = self.bus.handler_failures(),
            "Appservice runtime stopped"
        );
        Ok(())
    }
}
