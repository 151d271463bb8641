//! Budget Compass API Server
//!
//! REST API server for the Budget Compass budgeting platform: magic-link
//! authentication, monthly budgets, transactions, and savings balance
//! tracking.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings
//! compass-server
//!
//! # Start with custom config
//! compass-server --config /path/to/config.toml
//!
//! # Start with environment overrides
//! COMPASS__SERVER__PORT=8080 compass-server
//! ```

mod config;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use compass_api::{create_router, ApiConfig, AppState};
use compass_auth::{AuthConfig, AuthService};
use compass_db::{Database, DatabaseConfig as DbConfig};

use crate::config::ServerConfig;

/// Budget Compass API Server
#[derive(Parser, Debug)]
#[command(name = "compass-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "COMPASS_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "COMPASS_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "COMPASS_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "COMPASS_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log format (json, pretty)
    #[arg(long, env = "COMPASS_LOG_FORMAT", default_value = "pretty")]
    log_format: String,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// JWT secret key
    #[arg(long, env = "JWT_SECRET")]
    jwt_secret: Option<String>,

    /// Enable development mode (relaxed secret checks)
    #[arg(long, env = "COMPASS_DEV_MODE")]
    dev_mode: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut server_config = ServerConfig::load(args.config.as_deref())?;

    // CLI overrides
    if let Some(host) = args.host {
        server_config.server.host = host;
    }
    if let Some(port) = args.port {
        server_config.server.port = port;
    }
    if let Some(db_url) = args.database_url {
        server_config.database.postgres_url = db_url;
    }
    if let Some(jwt_secret) = args.jwt_secret {
        server_config.auth.jwt_secret = jwt_secret;
    }
    server_config.logging.level = args.log_level;
    server_config.logging.format = args.log_format;

    init_logging(&server_config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Budget Compass API Server"
    );

    validate_config(&server_config, args.dev_mode)?;

    let db = init_database(&server_config.database).await?;
    let auth = init_auth(&server_config.auth)?;

    let state = Arc::new(AppState::new(db, auth));

    let api_config = ApiConfig {
        enable_cors: server_config.api.enable_cors,
        cors_origins: server_config.api.cors_origins.clone(),
        enable_tracing: server_config.api.enable_tracing,
    };

    let app = create_router(state, api_config);

    let addr = server_config.server.socket_addr()?;

    tracing::info!(
        host = %server_config.server.host,
        port = %server_config.server.port,
        "Server listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(server_config.server.shutdown_timeout()))
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &config::LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber.with(fmt::layer().json().with_target(true)).init();
        }
        _ => {
            subscriber
                .with(fmt::layer().pretty().with_target(true))
                .init();
        }
    }

    Ok(())
}

/// Validate configuration
fn validate_config(config: &ServerConfig, dev_mode: bool) -> anyhow::Result<()> {
    if !dev_mode && config.auth.jwt_secret == "change-me-in-production" {
        anyhow::bail!(
            "JWT secret must be changed in production. Set JWT_SECRET environment variable."
        );
    }

    if !dev_mode && config.auth.jwt_secret.len() < 32 {
        anyhow::bail!("JWT secret must be at least 32 bytes");
    }

    Ok(())
}

/// Initialize database connection and run migrations
async fn init_database(config: &config::DatabaseSettings) -> anyhow::Result<Arc<Database>> {
    tracing::info!("Connecting to database...");

    let db_config = DbConfig {
        postgres_url: config.postgres_url.clone(),
        pg_max_connections: config.max_connections,
        pg_min_connections: config.min_connections,
        pg_acquire_timeout_secs: config.connect_timeout_secs,
    };

    let db = Database::connect(&db_config).await?;

    tracing::info!("Database connected successfully");

    if config.run_migrations {
        db.migrate().await?;
        tracing::info!("Migrations applied");
    }

    let health = db.health_check().await?;
    if !health.healthy {
        anyhow::bail!("Database health check failed");
    }

    tracing::info!(postgres = health.postgres, "Database health check passed");

    Ok(Arc::new(db))
}

/// Initialize authentication service
fn init_auth(config: &config::AuthSettings) -> anyhow::Result<Arc<AuthService>> {
    let auth_config = AuthConfig {
        jwt: compass_auth::JwtConfig {
            secret: config.jwt_secret.clone(),
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            access_token_lifetime: Duration::from_secs(config.access_token_lifetime_secs),
        },
        magic_link: compass_auth::MagicLinkConfig {
            lifetime: Duration::from_secs(config.magic_link_lifetime_secs),
            base_url: config.magic_link_base_url.clone(),
            ..Default::default()
        },
    };

    if let Err(errors) = auth_config.validate() {
        anyhow::bail!("Invalid auth configuration: {}", errors.join("; "));
    }

    tracing::info!("Authentication service initialized");

    Ok(Arc::new(AuthService::new(auth_config)))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    tracing::info!(
        timeout_secs = timeout.as_secs(),
        "Waiting for in-flight requests to complete..."
    );

    tokio::time::sleep(timeout).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["compass-server", "--port", "8080"]);
        assert_eq!(args.port, Some(8080));
    }

    #[test]
    fn test_config_validation_rejects_default_secret() {
        let config = ServerConfig::default();
        assert!(validate_config(&config, false).is_err());
        assert!(validate_config(&config, true).is_ok());
    }
}
