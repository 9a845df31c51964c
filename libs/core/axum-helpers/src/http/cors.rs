use axum::http::{HeaderValue, Method, header};
use core_config::Environment;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// CORS policy from a comma-separated origin list (`CORS_ALLOWED_ORIGIN`).
///
/// Without origins, development allows any origin while production allows none.
pub fn cors_layer(origins: Option<&str>, environment: &Environment) -> Result<CorsLayer, String> {
    let origins = origins
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<HeaderValue>()
                .map_err(|e| format!("invalid CORS origin '{s}': {e}"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if origins.is_empty() {
        if environment.is_development() {
            tracing::warn!("CORS_ALLOWED_ORIGIN unset, allowing any origin");
            return Ok(CorsLayer::permissive());
        }
        tracing::warn!("CORS_ALLOWED_ORIGIN unset, cross-origin requests disabled");
    }

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600)))
}
