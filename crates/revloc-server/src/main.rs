mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use revloc_engine::{EnrichmentSettings, PgStore, SearchSettings};
use revloc_geo::GeocodingGateway;
use revloc_registry::RegistryClient;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = revloc_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = revloc_db::connect_pool_from_config(&config).await?;
    revloc_db::run_migrations(&pool).await?;

    let state = AppState::new(
        Arc::new(PgStore::new(pool)),
        Arc::new(RegistryClient::from_config(&config)?),
        Arc::new(GeocodingGateway::from_config(&config)?),
        SearchSettings::from_app_config(&config),
        EnrichmentSettings::from_app_config(&config),
    );

    let _scheduler = scheduler::build_scheduler(
        Arc::clone(&state.enrichment),
        config.enrich_cron.as_deref(),
    )
    .await?;

    let auth = AuthState::from_env(matches!(
        config.env,
        revloc_core::Environment::Development
    ))?;
    let app = build_app(state, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "revloc-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
