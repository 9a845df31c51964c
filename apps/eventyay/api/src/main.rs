use axum_helpers::{JwtAuth, cors_layer, create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_events::GoogleGeocoder;
use migration::Migrator;
use std::sync::Arc;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("Database connection failed: {}", e))?;
    database::postgres::run_migrations::<Migrator>(&db, config.app.name).await?;

    let jwt_auth = JwtAuth::new(&config.jwt);
    let geocoder = GoogleGeocoder::new(config.geocoding.clone())
        .map_err(|e| eyre::eyre!("Failed to build geocoding client: {}", e))?;
    let cors = cors_layer(config.cors_origins.as_deref(), &config.environment)
        .map_err(|e| eyre::eyre!("Invalid CORS_ALLOWED_ORIGIN: {}", e))?;

    let state = AppState::new(config, db, jwt_auth, Arc::new(geocoder));

    let app = create_router::<openapi::ApiDoc>(api::routes(&state), cors)
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()));

    let server = state.config.server.clone();
    info!(
        "Starting Eventyay API with graceful shutdown ({:?} timeout)",
        server.shutdown_timeout
    );

    create_production_app(app, &server, server.shutdown_timeout, async move {
        info!("Shutting down: closing database connection");
        match state.db.close().await {
            Ok(_) => info!("Database connection closed"),
            Err(e) => tracing::error!("Error closing database connection: {}", e),
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Eventyay API shutdown complete");
    Ok(())
}
