//! # Axum Helpers
//!
//! Shared plumbing for the HTTP services in this workspace.
//!
//! - **[`auth`]**: HS256 bearer tokens and the [`Authenticated`] extractor
//! - **[`access`]**: capability chains evaluated against the resolved caller
//! - **[`server`]**: router assembly, health endpoints, graceful shutdown
//! - **[`http`]**: CORS and security headers
//! - **[`errors`]**: structured error responses with stable codes
//! - **[`extractors`]**: positive integer ids
//! - **[`audit`]**: structured audit events

pub mod access;
pub mod audit;
pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use access::{CallerResolver, Capability, Denied, Principal, authorize};
pub use audit::{AuditEvent, AuditOutcome, client_ip};
pub use auth::{AuthError, Authenticated, JwtAuth, JwtClaims, JwtConfig, jwt_auth_middleware};
pub use errors::{AppError, ErrorCode, ErrorResponse, error_response};
pub use extractors::IdPath;
pub use http::{cors_layer, security_headers};
pub use server::{
    HealthCheckFuture, HealthResponse, ReadyResponse, ShutdownCoordinator, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};
