use chrono_tz::Tz;
use database::dao::{DaoError, DaoResult, ResourceDao};
use database::FieldErrors;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::entity::{event, event_type, role, users_events_roles};
use crate::error::{EventError, EventResult};
use crate::geocoding::Geocoder;
use crate::models::{CreateEventType, EventFilter, NewEvent, UpdateEventType};
use crate::wizard::{WizardForm, current_timezone, event_time_field};

pub const EVENT_TYPES: ResourceDao<event_type::Entity, CreateEventType, UpdateEventType> =
    ResourceDao::new("event_type");

/// Events are created from the wizard and never edited through this API.
pub type EventDao = ResourceDao<event::Entity, NewEvent, ()>;

pub const EVENTS: EventDao = ResourceDao::new("event");

/// Event type CRUD over the generic DAO
#[derive(Clone)]
pub struct EventTypeService {
    db: DatabaseConnection,
}

impl EventTypeService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> EventResult<Vec<event_type::Model>> {
        Ok(EVENT_TYPES.list(&self.db).await?)
    }

    pub async fn get(&self, id: i32) -> EventResult<event_type::Model> {
        Ok(EVENT_TYPES.get(&self.db, id).await?)
    }

    pub async fn create(&self, attributes: Value) -> EventResult<event_type::Model> {
        Ok(EVENT_TYPES.create(&self.db, attributes).await?)
    }

    pub async fn update(&self, id: i32, attributes: Value) -> EventResult<event_type::Model> {
        Ok(EVENT_TYPES.update(&self.db, id, attributes).await?)
    }

    pub async fn delete(&self, id: i32) -> EventResult<event_type::Model> {
        Ok(EVENT_TYPES.delete(&self.db, id).await?)
    }

    /// Events of an existing type, in id order.
    pub async fn events(&self, id: i32) -> EventResult<Vec<event::Model>> {
        let event_type = EVENT_TYPES.get(&self.db, id).await?;
        let events = EventDao::ordered(
            event::Entity::find().filter(event::Column::EventTypeId.eq(event_type.id)),
        )
        .all(&self.db)
        .await
        .map_err(DaoError::from)?;
        Ok(events)
    }
}

/// Event creation and lookup
#[derive(Clone)]
pub struct EventService {
    db: DatabaseConnection,
    geocoder: Arc<dyn Geocoder>,
}

impl EventService {
    pub fn new(db: DatabaseConnection, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { db, geocoder }
    }

    pub async fn get(&self, id: i32) -> EventResult<event::Model> {
        Ok(EVENTS.get(&self.db, id).await?)
    }

    pub async fn list(&self, filter: EventFilter) -> EventResult<Vec<event::Model>> {
        let mut query = event::Entity::find();
        if let Some(type_id) = filter.event_type_id {
            query = query.filter(event::Column::EventTypeId.eq(type_id));
        }
        let events = EventDao::ordered(query)
            .all(&self.db)
            .await
            .map_err(DaoError::from)?;
        Ok(events)
    }

    /// Creates an event from the wizard form and makes `organizer_id` its organizer.
    ///
    /// Coordinates, when both present, are reverse geocoded before anything is written.
    pub async fn create_from_form(
        &self,
        organizer_id: i32,
        form: &WizardForm,
    ) -> EventResult<event::Model> {
        let mut new_event = parse_form(form).map_err(EventError::InvalidForm)?;

        if let Some(type_id) = new_event.event_type_id {
            if event_type::Entity::find_by_id(type_id)
                .one(&self.db)
                .await
                .map_err(DaoError::from)?
                .is_none()
            {
                return Err(EventError::InvalidForm(FieldErrors::single(
                    "event_type_id",
                    "does not exist",
                )));
            }
        }

        if let (Some(lat), Some(lng)) = (new_event.latitude, new_event.longitude) {
            new_event.searchable_location_name =
                self.geocoder.searchable_location_name(lat, lng).await;
        }

        let txn = self.db.begin().await.map_err(DaoError::from)?;
        let created = EVENTS.create_from(&txn, new_event).await?;
        assign_role(&txn, organizer_id, created.id, role::ORGANIZER).await?;
        txn.commit().await.map_err(DaoError::from)?;

        info!(event_id = created.id, organizer_id, "Event created from wizard");
        Ok(created)
    }
}

/// Grants `user_id` the named role on `event_id`.
pub async fn assign_role<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    event_id: i32,
    role_name: &str,
) -> DaoResult<users_events_roles::Model> {
    let role = role::Entity::find()
        .filter(role::Column::Name.eq(role_name))
        .one(db)
        .await?
        .ok_or_else(|| DaoError::Internal(format!("role '{role_name}' is not seeded")))?;

    let grant = users_events_roles::ActiveModel {
        user_id: Set(user_id),
        event_id: Set(event_id),
        role_id: Set(role.id),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(grant)
}

/// Events on which `user_id` holds any role other than `excluded_role`, in id order.
pub async fn events_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    excluded_role: &str,
) -> DaoResult<Vec<event::Model>> {
    let events = event::Entity::find()
        .join(JoinType::InnerJoin, event::Relation::UsersEventsRoles.def())
        .join(JoinType::InnerJoin, users_events_roles::Relation::Role.def())
        .filter(users_events_roles::Column::UserId.eq(user_id))
        .filter(role::Column::Name.ne(excluded_role))
        .distinct()
        .order_by_asc(event::Column::Id)
        .all(db)
        .await?;
    Ok(events)
}

const DATETIME_HINT: &str = "must be a date (MM/DD/YYYY) and a time (HH:MM)";

/// Wizard forms post empty strings for untouched inputs.
fn form_value<'a>(form: &'a WizardForm, key: &str) -> Option<&'a str> {
    form.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn parse_coordinate(
    form: &WizardForm,
    key: &str,
    bound: f64,
    errors: &mut FieldErrors,
) -> Option<f64> {
    let raw = form_value(form, key)?;
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value.abs() <= bound => Some(value),
        _ => {
            errors.add(key, format!("must be a number between -{bound} and {bound}"));
            None
        }
    }
}

/// Validates every wizard field, reporting all problems together.
fn parse_form(form: &WizardForm) -> Result<NewEvent, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = form_value(form, "name");
    match name {
        None => errors.add("name", "is required"),
        Some(n) if n.chars().count() > 255 => errors.add("name", "must be at most 255 characters"),
        Some(_) => {}
    }

    let starts_at = event_time_field(form, "start");
    if starts_at.is_none() {
        errors.add("start", DATETIME_HINT);
    }
    let ends_at = event_time_field(form, "end");
    if ends_at.is_none() {
        errors.add("end", DATETIME_HINT);
    }
    if let (Some(start), Some(end)) = (starts_at, ends_at) {
        if end < start {
            errors.add("end", "must not be before the start");
        }
    }

    let timezone = match form_value(form, "timezone") {
        Some(tz) if tz.parse::<Tz>().is_ok() => tz.to_string(),
        Some(_) => {
            errors.add("timezone", "must be an IANA timezone name");
            String::new()
        }
        None => current_timezone(),
    };

    let latitude = parse_coordinate(form, "latitude", 90.0, &mut errors);
    let longitude = parse_coordinate(form, "longitude", 180.0, &mut errors);

    let event_type_id = form_value(form, "event_type_id").and_then(|raw| {
        match raw.parse::<i32>() {
            Ok(id) if id > 0 => Some(id),
            _ => {
                errors.add("event_type_id", "must be a positive integer");
                None
            }
        }
    });

    match (name, starts_at, ends_at) {
        (Some(name), Some(starts_at), Some(ends_at)) if errors.is_empty() => Ok(NewEvent {
            name: name.to_string(),
            starts_at,
            ends_at,
            timezone,
            location_name: form_value(form, "location_name").map(str::to_string),
            searchable_location_name: None,
            latitude,
            longitude,
            event_type_id,
        }),
        _ => Err(errors),
    }
}
