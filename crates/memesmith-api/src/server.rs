//! HTTP server lifecycle.

use axum::Router;
use memesmith_core::MemesmithConfig;
use tokio::net::TcpListener;

use crate::error::{ApiError, Result};
use crate::routes::router;
use crate::state::AppState;

/// A configured, not yet listening, API server.
pub struct Server {
    address: String,
    app: Router,
}

impl Server {
    /// Build the server from configuration.
    pub fn new(config: MemesmithConfig) -> Result<Self> {
        let address = config.server.bind_address();
        let state = AppState::from_config(config)?;
        Ok(Self::with_state(address, state))
    }

    /// Build the server around prepared state.
    pub fn with_state(address: String, state: AppState) -> Self {
        Self {
            address,
            app: router(state),
        }
    }

    /// Address the server binds to.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Serve until Ctrl-C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(&self.address)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {}: {e}", self.address)))?;
        tracing::info!("Server running on {}", self.address);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ApiError::internal(format!("Server error: {e}")))?;

        tracing::info!("Server shut down");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
