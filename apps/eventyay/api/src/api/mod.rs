use axum::{Router, middleware, routing::get};
use axum_helpers::jwt_auth_middleware;

use crate::state::AppState;

pub mod health;

/// API routes without the `/api` prefix, which `create_router` adds.
///
/// Every route sees the verified token claims, if any; handlers decide
/// whether a caller is required.
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .merge(domain_users::router(state.users.clone()))
        .merge(domain_events::router(state.events()))
        .layer(middleware::from_fn_with_state(
            state.jwt_auth.clone(),
            jwt_auth_middleware,
        ))
}

/// `GET /ready`, merged next to `/health` outside the `/api` prefix.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
