//! SeaORM entities for the tables this domain owns.

pub mod event;
pub mod event_type;
pub mod role;
pub mod users_events_roles;
