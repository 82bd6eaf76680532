//! login-shield - Brute-force protection and session tokens for login endpoints
//!
//! This is the main entry point for the login-shield application.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing::info;

use login_shield::auth::{AuthConfig, AuthManager};
use login_shield::config::Config;
use login_shield::directory::MemoryUserDirectory;
use login_shield::ledger::{AttemptLedger, LedgerConfig};
use login_shield::otel::{init_tracing, Metrics, OtelProvider};
use login_shield::server::{AppState, Server};
use login_shield::store::{ListStore, RedisListStore, RedisStoreConfig};
use login_shield::token::JwtSigner;

/// login-shield - Brute-force protection and session tokens for login endpoints
#[derive(Parser, Debug)]
#[command(name = "login-shield")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "LOGIN_SHIELD_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let config = load_config(&args)?;

    // Initialize OpenTelemetry provider and tracing/logging
    let otel_provider = OtelProvider::new(&config.otel)?;
    init_tracing(&otel_provider, &config.logging.level)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting login-shield"
    );

    let jwt_secret = config
        .auth
        .jwt_secret
        .clone()
        .ok_or_else(|| anyhow::anyhow!("auth.jwt_secret must be configured"))?;

    // Connect the shared store; the connection manager reconnects on its own
    // after transient failures, so this only fails on startup misconfiguration.
    let store: Arc<dyn ListStore> = Arc::new(
        RedisListStore::connect(&RedisStoreConfig {
            url: config.store.url.clone(),
            op_timeout: Duration::from_millis(config.store.op_timeout_ms),
        })
        .await?,
    );
    info!(url = %config.store.url, "Connected to shared store");

    let metrics = Arc::new(Metrics::new(&otel_provider.meter()));

    let ledger = Arc::new(
        AttemptLedger::new(
            store,
            LedgerConfig {
                max_attempts: config.ledger.max_attempts,
                window: Duration::from_secs(config.ledger.window_secs),
                key_suffix: config.ledger.key_suffix.clone(),
            },
        )
        .with_metrics(Arc::clone(&metrics)),
    );

    let auth_manager = Arc::new(
        AuthManager::new(
            Arc::new(MemoryUserDirectory::new()),
            Arc::new(JwtSigner::new(&jwt_secret)),
            Arc::clone(&ledger),
            AuthConfig {
                token_duration: Duration::from_secs(config.auth.token_duration_secs),
            },
        )
        .with_metrics(Arc::clone(&metrics)),
    );

    let state = AppState {
        auth_manager,
        ledger,
        metrics: Some(metrics),
    };

    let server = Server::new(config.server.clone(), state);
    server.run(shutdown_signal()).await?;

    otel_provider.shutdown()?;
    Ok(())
}

/// Load configuration from the given file, or from the environment
fn load_config(args: &Args) -> anyhow::Result<Config> {
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    Ok(config)
}

/// Resolves when the process receives a shutdown signal
async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("Shutdown signal received");
}
