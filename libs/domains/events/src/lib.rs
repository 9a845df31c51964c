//! Events Domain
//!
//! Event types served as JSON:API resources, event creation from the
//! wizard form, and the lookups other domains use to find a user's events.
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← /event-types (JSON:API), /events
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌────────────┐
//! │  Services   │ ──▶ │  Geocoder  │  ← reverse geocoding, degrades to None
//! └──────┬──────┘     └────────────┘
//!        │
//! ┌──────▼──────┐
//! │ ResourceDao │  ← generic CRUD from `database::dao`
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Entities   │  ← events, event_types, roles, users_events_roles
//! └─────────────┘
//! ```

pub mod entity;
pub mod error;
pub mod geocoding;
pub mod handlers;
pub mod jsonapi;
pub mod models;
pub mod service;
pub mod wizard;

pub use error::{EventError, EventResult};
pub use geocoding::{Geocoder, GeocodingConfig, GoogleGeocoder};
pub use handlers::{ApiDoc, EventsState, router};
pub use models::{EventFilter, EventResponse};
pub use service::{EventService, EventTypeService, assign_role, events_for_user};
pub use wizard::{WizardForm, current_timezone, event_time_field};
