//! HTTP server components for login-shield
//!
//! This module provides the HTTP server infrastructure including:
//! - Router configuration and route handlers
//! - Bearer-token authentication middleware
//! - Server lifecycle management

pub mod middleware;
pub mod router;

pub use middleware::AuthenticatedSubject;
pub use router::{build_router, ApiError, AppState, HealthResponse, MetricsResponse};

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::ServerConfig;

/// HTTP Server for login-shield
///
/// Manages the axum server lifecycle, including:
/// - Binding to configured address
/// - Applying middleware layers
/// - Graceful shutdown handling
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.config.host.parse().unwrap_or([0, 0, 0, 0].into()),
            self.config.port,
        )
    }

    /// Run the server until shutdown signal is received
    ///
    /// # Arguments
    ///
    /// * `shutdown` - Future that resolves when the server should shut down
    pub async fn run(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let addr = self.bind_addr();
        let app = build_router(self.state);

        // Apply middleware layers
        let app = app
            .layer(tower_http::trace::TraceLayer::new_for_http())
            .layer(tower_http::compression::CompressionLayer::new());

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(e.to_string()))?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to address
    #[error("Failed to bind to address: {0}")]
    Bind(String),

    /// Failed to serve requests
    #[error("Server error: {0}")]
    Serve(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::auth::{AuthConfig, AuthManager};
    use crate::directory::MemoryUserDirectory;
    use crate::ledger::{AttemptLedger, LedgerConfig};
    use crate::store::MemoryListStore;
    use crate::token::JwtSigner;

    fn create_test_state() -> AppState {
        let ledger = Arc::new(AttemptLedger::new(
            Arc::new(MemoryListStore::new()),
            LedgerConfig::default(),
        ));
        let auth_manager = Arc::new(AuthManager::new(
            Arc::new(MemoryUserDirectory::new()),
            Arc::new(JwtSigner::new("test-secret")),
            Arc::clone(&ledger),
            AuthConfig::default(),
        ));

        AppState {
            auth_manager,
            ledger,
            metrics: None,
        }
    }

    // Test 1: Bind address uses the configured host and port
    #[test]
    fn test_bind_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 9090,
            ..Default::default()
        };
        let server = Server::new(config, create_test_state());

        assert_eq!(server.bind_addr().to_string(), "127.0.0.1:9090");
    }

    // Test 2: An unparseable host falls back to 0.0.0.0
    #[test]
    fn test_bind_addr_fallback() {
        let config = ServerConfig {
            host: "not-an-ip".to_string(),
            port: 8080,
            ..Default::default()
        };
        let server = Server::new(config, create_test_state());

        assert_eq!(server.bind_addr().to_string(), "0.0.0.0:8080");
    }
}
