use chrono::NaiveDateTime;
use database::dao::{CreateSchema, DaoResult, UpdateSchema};
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::entity::{event, event_type};

/// `"Tech Talks & Meetups"` -> `"tech-talks-meetups"`, `"Café Crème"` -> `"café-crème"`
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Names made only of punctuation or whitespace would get an empty slug.
fn validate_sluggable(name: &str) -> Result<(), validator::ValidationError> {
    if slugify(name).is_empty() {
        return Err(validator::ValidationError::new("slug")
            .with_message("must contain at least one letter or digit".into()));
    }
    Ok(())
}

/// Attributes accepted when creating an event type; `slug` is derived from `name`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub struct CreateEventType {
    #[validate(
        required(message = "is required"),
        length(min = 1, max = 255, message = "must be 1-255 characters"),
        custom(function = "validate_sluggable")
    )]
    pub name: Option<String>,
}

impl CreateSchema<event_type::ActiveModel> for CreateEventType {
    fn into_active_model(self) -> DaoResult<event_type::ActiveModel> {
        let name = self.name.unwrap_or_default();
        Ok(event_type::ActiveModel {
            slug: Set(slugify(&name)),
            name: Set(name),
            ..Default::default()
        })
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub struct UpdateEventType {
    #[validate(
        length(min = 1, max = 255, message = "must be 1-255 characters"),
        custom(function = "validate_sluggable")
    )]
    pub name: Option<String>,
}

impl UpdateSchema<event_type::ActiveModel> for UpdateEventType {
    fn apply(self, model: &mut event_type::ActiveModel) {
        if let Some(name) = self.name {
            model.slug = Set(slugify(&name));
            model.name = Set(name);
        }
    }
}

/// Event assembled from a validated wizard form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewEvent {
    pub name: String,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub timezone: String,
    pub location_name: Option<String>,
    pub searchable_location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub event_type_id: Option<i32>,
}

impl CreateSchema<event::ActiveModel> for NewEvent {
    fn into_active_model(self) -> DaoResult<event::ActiveModel> {
        Ok(event::ActiveModel {
            name: Set(self.name),
            starts_at: Set(self.starts_at),
            ends_at: Set(self.ends_at),
            timezone: Set(self.timezone),
            location_name: Set(self.location_name),
            searchable_location_name: Set(self.searchable_location_name),
            latitude: Set(self.latitude),
            longitude: Set(self.longitude),
            event_type_id: Set(self.event_type_id),
            ..Default::default()
        })
    }
}

/// Event as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EventResponse {
    pub id: i32,
    pub name: String,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub timezone: String,
    pub location_name: Option<String>,
    pub searchable_location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub event_type_id: Option<i32>,
}

impl From<event::Model> for EventResponse {
    fn from(model: event::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            starts_at: model.starts_at,
            ends_at: model.ends_at,
            timezone: model.timezone,
            location_name: model.location_name,
            searchable_location_name: model.searchable_location_name,
            latitude: model.latitude,
            longitude: model.longitude,
            event_type_id: model.event_type_id,
        }
    }
}

/// Fields posted by the event wizard (`application/x-www-form-urlencoded`)
#[derive(ToSchema)]
pub struct EventForm {
    pub name: String,
    /// `MM/DD/YYYY`
    pub start_date: String,
    /// `HH:MM`
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
    /// IANA name; defaults to the server's local timezone
    pub timezone: Option<String>,
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub event_type_id: Option<i32>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventFilter {
    /// Only events of this type
    pub event_type_id: Option<i32>,
}
