mod agent;
mod config;
mod errors;
mod models;
mod routes;
mod service;

use tracing::{info, warn};

use crate::agent::GroqAgentService;
use crate::config::{RelayConfig, API_KEY_VAR};
use crate::routes::{build_router, RELAY_PATH};
use crate::service::relay_service::RelayService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    // Initialise tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "legalai_relay=debug,tower_http=debug".into()),
        )
        .init();

    // ── Configuration ─────────────────────────────────────────────────────────
    let config = RelayConfig::from_env();
    if config.api_key.is_none() {
        warn!("{API_KEY_VAR} is not set; chat requests will fail until it is configured");
    }
    info!(
        "Upstream {} (model {}, timeout {:?})",
        config.base_url, config.model, config.upstream_timeout
    );

    // ── Dependency wiring ─────────────────────────────────────────────────────
    let agent = GroqAgentService::new(&config)?;
    let relay = RelayService::new(&config, agent);
    let app = build_router(relay);

    // ── Listen ────────────────────────────────────────────────────────────────
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{addr}{RELAY_PATH}");

    axum::serve(listener, app).await?;
    Ok(())
}
