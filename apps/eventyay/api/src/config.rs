use axum_helpers::JwtConfig;
use core_config::{AppInfo, FromEnv, app_info, env_optional, server::ServerConfig};
use database::PageBounds;
use database::postgres::PostgresConfig;
use domain_events::GeocodingConfig;

pub use core_config::Environment;

/// Everything the service reads from the environment at start-up
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub page_bounds: PageBounds,
    pub geocoding: GeocodingConfig,
    /// Comma-separated allow-list, `CORS_ALLOWED_ORIGIN`
    pub cors_origins: Option<String>,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();

        Ok(Self {
            app: app_info!(),
            database: PostgresConfig::from_env()?,
            server: ServerConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            page_bounds: PageBounds::from_env()?,
            geocoding: GeocodingConfig::from_env()?,
            cors_origins: env_optional("CORS_ALLOWED_ORIGIN"),
            environment,
        })
    }
}
