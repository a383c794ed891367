//! Server lifecycle: bind, serve in the background, shut down gracefully.

use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::router::build_router;
use crate::service::ProtocolGateway;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

struct Running {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

/// HTTP server exposing a [`ProtocolGateway`].
pub struct AppserviceServer {
    config: GatewayConfig,
    gateway: Arc<ProtocolGateway>,
    running: Option<Running>,
}

impl AppserviceServer {
    /// Create a server. Nothing is bound until [`listen`](Self::listen).
    pub fn new(config: GatewayConfig, gateway: Arc<ProtocolGateway>) -> Result<Self, GatewayError> {
        config.validate()?;
        Ok(Self {
            config,
            gateway,
            running: None,
        })
    }

    pub fn gateway(&self) -> &Arc<ProtocolGateway> {
        &self.gateway
    }

    /// Bound address while the server runs.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.addr)
    }

    /// Bind the configured address and start serving in a background task.
    ///
    /// Returns the bound address, which differs from the configured one
    /// when port 0 was requested.
    pub async fn listen(&mut self) -> Result<SocketAddr, GatewayError> {
        if self.running.is_some() {
            return Err(GatewayError::AlreadyStarted);
        }

        let listener = TcpListener::bind(self.config.bind_addr())
            .await
            .map_err(GatewayError::Bind)?;
        let addr = listener.local_addr().map_err(GatewayError::Bind)?;
        let router = build_router(Arc::clone(&self.gateway), &self.config);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        info!(addr = %addr, legacy_routes = self.config.legacy_routes, "Appservice listening");
        self.running = Some(Running {
            addr,
            shutdown_tx,
            handle,
        });
        Ok(addr)
    }

    /// Stop accepting connections and wait for in-flight requests.
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotStarted`] if the server is not running.
    pub async fn close(&mut self) -> Result<(), GatewayError> {
        let running = self.running.take().ok_or(GatewayError::NotStarted)?;
        let _ = running.shutdown_tx.send(());

        match running.handle.await {
            Ok(Ok(())) => {
                info!(addr = %running.addr, "Appservice stopped");
                Ok(())
            }
            Ok(Err(e)) => {
                error!(error = %e, "HTTP server error");
                Err(GatewayError::Internal(e.to_string()))
            }
            Err(e) => Err(GatewayError::Internal(e.to_string())),
        }
    }
}
