//! Users Domain
//!
//! Accounts with a one-to-one profile (`user_detail`), the `/users` routes and
//! the [`CallerResolver`](axum_helpers::CallerResolver) every other domain uses
//! to turn a verified token into a [`Caller`].
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← /users, capability chains per route
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ UserService │  ← also resolves callers
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   UserDao   │  ← ResourceDao + user_detail SubResource
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Entities   │  ← users, user_details
//! └─────────────┘
//! ```

pub mod dao;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod service;

pub use dao::UserDao;
pub use error::{UserError, UserResult};
pub use handlers::{ApiDoc, router};
pub use models::{CreateUser, UpdateUser, UpdateUserDetail, UserResponse, UserWithDetail};
pub use service::{Caller, UserService};
