//! JWT authentication
//!
//! [`jwt_auth_middleware`] verifies bearer tokens and stores their claims on
//! the request. [`Authenticated`] pulls them back out in handlers, answering
//! 401 when absent. Authorization decisions live in [`crate::access`].

pub mod config;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use jwt::{AuthError, JwtAuth, JwtClaims};
pub use middleware::{Authenticated, jwt_auth_middleware};
