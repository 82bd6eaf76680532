//! Common test utilities and helpers for integration tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use login_shield::auth::{AuthConfig, AuthManager};
use login_shield::directory::MemoryUserDirectory;
use login_shield::ledger::{AttemptLedger, LedgerConfig};
use login_shield::server::AppState;
use login_shield::store::MemoryListStore;
use login_shield::token::JwtSigner;

/// Secret shared by every test server instance
pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// Create a test application state with default limits
pub fn create_test_state() -> AppState {
    create_test_state_with(LedgerConfig::default(), AuthConfig::default())
}

/// Create a test application state with explicit ledger and auth settings
pub fn create_test_state_with(ledger_config: LedgerConfig, auth_config: AuthConfig) -> AppState {
    let ledger = Arc::new(AttemptLedger::new(
        Arc::new(MemoryListStore::new()),
        ledger_config,
    ));
    let auth_manager = Arc::new(AuthManager::new(
        Arc::new(MemoryUserDirectory::new()),
        Arc::new(JwtSigner::new(TEST_JWT_SECRET)),
        Arc::clone(&ledger),
        auth_config,
    ));

    AppState {
        auth_manager,
        ledger,
        metrics: None,
    }
}

/// Run a test server in the background and return the address
/// The server will be shut down when the returned shutdown sender is dropped or sent
pub async fn run_test_server(state: AppState) -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get local address");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let app = login_shield::server::build_router(state)
        .layer(tower_http::trace::TraceLayer::new_for_http());

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("Server error");
    });

    // Give the server a moment to start (100ms is sufficient for slow CI systems)
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    (addr, shutdown_tx)
}

/// JSON body for user registration
pub fn register_body(email: &str, password: &str) -> serde_json::Value {
    serde_json::json!({
        "email": email,
        "first_name": "Ada",
        "last_name": "Lovelace",
        "password": password,
    })
}

/// JSON body for login
pub fn login_body(email: &str, password: &str) -> serde_json::Value {
    serde_json::json!({
        "email": email,
        "password": password,
    })
}
