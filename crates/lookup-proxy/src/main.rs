//! Lookup Proxy - Entry point.

use anyhow::{Context, Result};
use lookup_proxy::{
    api::{create_router, ApiKey, AppState, RateLimitState, RouterConfig},
    config::Config,
    PendingLogins,
};
use phone_lookup::GrammersConnector;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Lookup Proxy");

    std::fs::create_dir_all(&config.telegram.session_dir).with_context(|| {
        format!(
            "Failed to create session directory {}",
            config.telegram.session_dir.display()
        )
    })?;
    info!("Storing sessions in {}", config.telegram.session_dir.display());

    let connector = GrammersConnector::new(config.telegram.session_dir.clone());

    let pending = PendingLogins::new(config.telegram.pending_login_ttl);
    pending.spawn_cleanup();

    // Create application state
    let state = AppState::new(Arc::new(connector), pending)
        .with_defaults(config.api_id, config.api_hash.clone());

    let api_key = ApiKey::new(&config.api_key);
    info!("API key fingerprint {}", api_key.fingerprint());

    let router_config = RouterConfig {
        api_key,
        rate_limit: RateLimitState::new(config.rate_limit.global_per_minute),
        cors_permissive: config.server.cors_permissive,
    };
    let app = create_router(state, router_config);

    // Bind to address
    let ip: IpAddr = config
        .server
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.server.listen_addr))?;
    let addr = SocketAddr::new(ip, config.server.port);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on {}", addr);

    // Run server
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
