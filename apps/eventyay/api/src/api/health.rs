//! Readiness probe backed by a database ping.

use axum::{extract::State, response::IntoResponse};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};

use crate::state::AppState;

pub async fn ready_handler(State(state): State<AppState>) -> impl IntoResponse {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "database",
        Box::pin(async {
            database::postgres::check_health(&state.db)
                .await
                .map_err(|e| e.to_string())
        }),
    )];

    run_health_checks(checks).await
}
