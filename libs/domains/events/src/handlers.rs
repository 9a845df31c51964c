use axum::{
    Form, Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AppError, AuditEvent, AuditOutcome, Authenticated, CallerResolver, Capability, IdPath,
    Principal, authorize,
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::jsonapi::{EventTypeCollection, EventTypeDocument, EventTypeInput, JsonApi};
use crate::models::{EventFilter, EventForm, EventResponse};
use crate::service::{EventService, EventTypeService};
use crate::wizard::WizardForm;

pub const EVENT_TYPES_TAG: &str = "event-types";
pub const EVENTS_TAG: &str = "events";

#[derive(OpenApi)]
#[openapi(
    paths(
        list_event_types,
        create_event_type,
        get_event_type,
        update_event_type,
        delete_event_type,
        event_type_events,
        list_events,
        create_event,
        get_event,
    ),
    components(
        schemas(EventTypeDocument, EventTypeCollection, EventTypeInput, EventResponse, EventForm),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = EVENT_TYPES_TAG, description = "Event types as JSON:API resources"),
        (name = EVENTS_TAG, description = "Event creation and lookup")
    )
)]
pub struct ApiDoc;

/// Shared state of the event routes
pub struct EventsState<R> {
    pub event_types: EventTypeService,
    pub events: EventService,
    pub callers: Arc<R>,
}

impl<R> Clone for EventsState<R> {
    fn clone(&self) -> Self {
        Self {
            event_types: self.event_types.clone(),
            events: self.events.clone(),
            callers: Arc::clone(&self.callers),
        }
    }
}

/// Routes for `/event-types` and `/events`
pub fn router<R: CallerResolver>(state: EventsState<R>) -> Router {
    Router::new()
        .route(
            "/event-types",
            get(list_event_types::<R>).post(create_event_type::<R>),
        )
        .route(
            "/event-types/{id}",
            get(get_event_type::<R>)
                .patch(update_event_type::<R>)
                .delete(delete_event_type::<R>),
        )
        .route("/event-types/{id}/events", get(event_type_events::<R>))
        .route("/events", get(list_events::<R>).post(create_event::<R>))
        .route("/events/{id}", get(get_event::<R>))
        .with_state(state)
}

async fn require_staff<R: CallerResolver>(
    state: &EventsState<R>,
    claims: &axum_helpers::JwtClaims,
) -> Result<R::Caller, AppError> {
    let caller = state.callers.resolve(claims).await?;
    authorize(&caller, &[Capability::StaffOnly])?;
    Ok(caller)
}

/// List event types
#[utoipa::path(
    get,
    path = "/event-types",
    tag = EVENT_TYPES_TAG,
    responses(
        (status = 200, description = "Event type collection", body = EventTypeCollection,
            content_type = "application/vnd.api+json"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_event_types<R: CallerResolver>(
    State(state): State<EventsState<R>>,
) -> Result<JsonApi<EventTypeCollection>, AppError> {
    let types = state.event_types.list().await?;
    Ok(JsonApi(types.into()))
}

/// Create an event type (staff only)
#[utoipa::path(
    post,
    path = "/event-types",
    tag = EVENT_TYPES_TAG,
    request_body(content = EventTypeInput, content_type = "application/vnd.api+json"),
    responses(
        (status = 201, description = "Event type created", body = EventTypeDocument,
            content_type = "application/vnd.api+json"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn create_event_type<R: CallerResolver>(
    State(state): State<EventsState<R>>,
    Authenticated(claims): Authenticated,
    body: Result<Json<EventTypeInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    require_staff(&state, &claims).await?;
    let Json(input) = body?;
    let attributes = input.into_create_attributes()?;
    let created = state.event_types.create(attributes).await?;
    Ok((StatusCode::CREATED, JsonApi(EventTypeDocument::from(created))))
}

/// Get an event type
#[utoipa::path(
    get,
    path = "/event-types/{id}",
    tag = EVENT_TYPES_TAG,
    params(("id" = i32, Path, description = "Event type ID")),
    responses(
        (status = 200, description = "Event type", body = EventTypeDocument,
            content_type = "application/vnd.api+json"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_event_type<R: CallerResolver>(
    State(state): State<EventsState<R>>,
    IdPath(id): IdPath,
) -> Result<JsonApi<EventTypeDocument>, AppError> {
    let event_type = state.event_types.get(id).await?;
    Ok(JsonApi(event_type.into()))
}

/// Partially update an event type (staff only)
#[utoipa::path(
    patch,
    path = "/event-types/{id}",
    tag = EVENT_TYPES_TAG,
    params(("id" = i32, Path, description = "Event type ID")),
    request_body(content = EventTypeInput, content_type = "application/vnd.api+json"),
    responses(
        (status = 200, description = "Event type updated", body = EventTypeDocument,
            content_type = "application/vnd.api+json"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn update_event_type<R: CallerResolver>(
    State(state): State<EventsState<R>>,
    Authenticated(claims): Authenticated,
    IdPath(id): IdPath,
    body: Result<Json<EventTypeInput>, JsonRejection>,
) -> Result<JsonApi<EventTypeDocument>, AppError> {
    require_staff(&state, &claims).await?;
    let Json(input) = body?;
    let attributes = input.into_update_attributes(id)?;
    let updated = state.event_types.update(id, attributes).await?;
    Ok(JsonApi(updated.into()))
}

/// Delete an event type (staff only)
#[utoipa::path(
    delete,
    path = "/event-types/{id}",
    tag = EVENT_TYPES_TAG,
    params(("id" = i32, Path, description = "Event type ID")),
    responses(
        (status = 200, description = "Event type deleted"),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn delete_event_type<R: CallerResolver>(
    State(state): State<EventsState<R>>,
    Authenticated(claims): Authenticated,
    headers: HeaderMap,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, AppError> {
    let caller = require_staff(&state, &claims).await?;
    let deleted = state.event_types.delete(id).await?;

    AuditEvent::new(
        Some(caller.principal_id()),
        "event_type.delete",
        AuditOutcome::Success,
    )
    .with_resource("event_type", deleted.id)
    .with_request(&headers)
    .with_details(json!({ "name": deleted.name }))
    .log();

    Ok(JsonApi(json!({ "meta": { "message": "Object successfully deleted" } })))
}

/// Events of an event type
#[utoipa::path(
    get,
    path = "/event-types/{id}/events",
    tag = EVENT_TYPES_TAG,
    params(("id" = i32, Path, description = "Event type ID")),
    responses(
        (status = 200, description = "Related events", body = Vec<EventResponse>),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn event_type_events<R: CallerResolver>(
    State(state): State<EventsState<R>>,
    IdPath(id): IdPath,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let events = state.event_types.events(id).await?;
    Ok(Json(events.into_iter().map(EventResponse::from).collect()))
}

/// List events
#[utoipa::path(
    get,
    path = "/events",
    tag = EVENTS_TAG,
    params(EventFilter),
    responses(
        (status = 200, description = "Events in id order", body = Vec<EventResponse>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_events<R: CallerResolver>(
    State(state): State<EventsState<R>>,
    query: Result<Query<EventFilter>, QueryRejection>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let Query(filter) = query?;
    let events = state.events.list(filter).await?;
    Ok(Json(events.into_iter().map(EventResponse::from).collect()))
}

/// Create an event from the wizard form; the caller becomes its organizer
#[utoipa::path(
    post,
    path = "/events",
    tag = EVENTS_TAG,
    request_body(content = EventForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn create_event<R: CallerResolver>(
    State(state): State<EventsState<R>>,
    Authenticated(claims): Authenticated,
    headers: HeaderMap,
    Form(form): Form<WizardForm>,
) -> Result<impl IntoResponse, AppError> {
    let caller = state.callers.resolve(&claims).await?;
    let created = state
        .events
        .create_from_form(caller.principal_id(), &form)
        .await?;

    AuditEvent::new(
        Some(caller.principal_id()),
        "event.create",
        AuditOutcome::Success,
    )
    .with_resource("event", created.id)
    .with_request(&headers)
    .log();

    Ok((StatusCode::CREATED, Json(EventResponse::from(created))))
}

/// Get an event
#[utoipa::path(
    get,
    path = "/events/{id}",
    tag = EVENTS_TAG,
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event", body = EventResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_event<R: CallerResolver>(
    State(state): State<EventsState<R>>,
    IdPath(id): IdPath,
) -> Result<Json<EventResponse>, AppError> {
    let event = state.events.get(id).await?;
    Ok(Json(event.into()))
}
