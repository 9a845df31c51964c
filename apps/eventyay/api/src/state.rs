//! Shared application state, built once in `main` and cloned into routers.

use axum_helpers::JwtAuth;
use domain_events::{EventService, EventTypeService, EventsState, Geocoder};
use domain_users::UserService;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Connection pool shared by every service
    pub db: DatabaseConnection,
    pub jwt_auth: JwtAuth,
    pub users: Arc<UserService>,
    pub geocoder: Arc<dyn Geocoder>,
}

impl AppState {
    pub fn new(
        config: Config,
        db: DatabaseConnection,
        jwt_auth: JwtAuth,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        let users = Arc::new(UserService::new(db.clone(), config.page_bounds));
        Self {
            config,
            db,
            jwt_auth,
            users,
            geocoder,
        }
    }

    /// Event routes resolve their callers through the user service.
    pub fn events(&self) -> EventsState<UserService> {
        EventsState {
            event_types: EventTypeService::new(self.db.clone()),
            events: EventService::new(self.db.clone(), Arc::clone(&self.geocoder)),
            callers: Arc::clone(&self.users),
        }
    }
}
