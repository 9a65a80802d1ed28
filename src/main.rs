//! Taskboard server entry point.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use taskboard::adapters::{BcryptPasswordHasher, PostgresTaskboardStore};
use taskboard::app::{build_app, build_state};
use taskboard::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    tracing::info!(database = %config.database.redacted_url(), "connecting");
    let store = PostgresTaskboardStore::connect(&config.database).await?;
    if config.database.run_migrations {
        store.migrate().await?;
        tracing::info!("database migrations applied");
    }

    let hasher = BcryptPasswordHasher::new(config.security.bcrypt_cost);
    let state = build_state(Arc::new(store), Arc::new(hasher), &config.realtime);
    let app = build_app(state, &config.server).await?;

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "taskboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("taskboard stopped");
    Ok(())
}

/// `RUST_LOG` wins over `server.log_level`; production logs are JSON.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
