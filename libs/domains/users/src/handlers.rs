use axum::{
    Json, Router,
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
    JwtClaims, authorize,
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use database::{PageRequest, PageResult};
use domain_events::EventResponse;
use serde_json::Value;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{CreateUser, UpdateUserDetail, UserDetailResponse, UserPut, UserResponse};
use crate::service::{Caller, UserService};

pub const USERS_TAG: &str = "users";

#[derive(OpenApi)]
#[openapi(
    paths(
        list_users,
        create_user,
        users_page,
        get_me,
        my_events,
        my_tickets,
        get_user,
        update_user,
        delete_user,
    ),
    components(
        schemas(CreateUser, UserPut, UpdateUserDetail, UserResponse, UserDetailResponse, PageResult<UserResponse>),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags((name = USERS_TAG, description = "User accounts and profiles"))
)]
pub struct ApiDoc;

/// Routes for `/users`
pub fn router(service: Arc<UserService>) -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/page", get(users_page))
        .route("/users/me", get(get_me))
        .route("/users/me/events", get(my_events))
        .route("/users/me/tickets", get(my_tickets))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .with_state(service)
}

async fn authorized(
    service: &UserService,
    claims: &JwtClaims,
    chain: &[Capability],
) -> Result<Caller, AppError> {
    let caller = service.resolve(claims).await?;
    authorize(&caller, chain)?;
    Ok(caller)
}

/// List all users (staff only)
#[utoipa::path(
    get,
    path = "/users",
    tag = USERS_TAG,
    responses(
        (status = 200, description = "Every user in id order", body = Vec<UserResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn list_users(
    State(service): State<Arc<UserService>>,
    Authenticated(claims): Authenticated,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    authorized(&service, &claims, &[Capability::StaffOnly]).await?;
    let users = service.list().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Sign up with email and password
#[utoipa::path(
    post,
    path = "/users",
    tag = USERS_TAG,
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user(
    State(service): State<Arc<UserService>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(raw) = body?;
    let created = service.create(raw).await?;

    AuditEvent::new(None, "user.create", AuditOutcome::Success)
        .with_resource("user", created.user.id)
        .with_request(&headers)
        .log();

    Ok((StatusCode::CREATED, Json(UserResponse::from(created))))
}

/// One page of users (staff only)
#[utoipa::path(
    get,
    path = "/users/page",
    tag = USERS_TAG,
    params(PageRequest),
    responses(
        (status = 200, description = "Page of users", body = PageResult<UserResponse>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn users_page(
    State(service): State<Arc<UserService>>,
    Authenticated(claims): Authenticated,
    query: Result<Query<PageRequest>, QueryRejection>,
) -> Result<Json<PageResult<UserResponse>>, AppError> {
    authorized(&service, &claims, &[Capability::StaffOnly]).await?;
    let Query(request) = query?;
    let page = service.page(request).await?;
    Ok(Json(page.map(UserResponse::from)))
}

/// The authenticated user
#[utoipa::path(
    get,
    path = "/users/me",
    tag = USERS_TAG,
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn get_me(
    State(service): State<Arc<UserService>>,
    Authenticated(claims): Authenticated,
) -> Result<Json<UserResponse>, AppError> {
    let caller = authorized(&service, &claims, &[]).await?;
    let user = service.get(caller.id).await?;
    Ok(Json(user.into()))
}

/// Events the authenticated user organizes or helps run
#[utoipa::path(
    get,
    path = "/users/me/events",
    tag = USERS_TAG,
    responses(
        (status = 200, description = "Events with a non-attendee role", body = Vec<EventResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn my_events(
    State(service): State<Arc<UserService>>,
    Authenticated(claims): Authenticated,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let caller = authorized(&service, &claims, &[]).await?;
    let events = service.events_of(caller.id).await?;
    Ok(Json(events.into_iter().map(EventResponse::from).collect()))
}

/// Events listed on the authenticated user's tickets page
#[utoipa::path(
    get,
    path = "/users/me/tickets",
    tag = USERS_TAG,
    responses(
        (status = 200, description = "Events with a non-attendee role", body = Vec<EventResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn my_tickets(
    State(service): State<Arc<UserService>>,
    Authenticated(claims): Authenticated,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let caller = service.resolve(&claims).await?;
    authorize(&caller, &[Capability::AccessAccount(caller.id)])?;
    let events = service.events_of(caller.id).await?;
    Ok(Json(events.into_iter().map(EventResponse::from).collect()))
}

/// Get a user
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = USERS_TAG,
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn get_user(
    State(service): State<Arc<UserService>>,
    Authenticated(claims): Authenticated,
    IdPath(id): IdPath,
) -> Result<Json<UserResponse>, AppError> {
    authorized(&service, &claims, &[Capability::AccessAccount(id)]).await?;
    let user = service.get(id).await?;
    Ok(Json(user.into()))
}

/// Partially update a user and its nested `user_detail`
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = USERS_TAG,
    params(("id" = i32, Path, description = "User ID")),
    request_body = UserPut,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn update_user(
    State(service): State<Arc<UserService>>,
    Authenticated(claims): Authenticated,
    headers: HeaderMap,
    IdPath(id): IdPath,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let caller = authorized(&service, &claims, &[Capability::AccessAccount(id)]).await?;
    let Json(raw) = body?;
    let updated = service.update(id, raw).await?;

    AuditEvent::new(Some(caller.id), "user.update", AuditOutcome::Success)
        .with_resource("user", id)
        .with_request(&headers)
        .log();

    Ok(Json(updated.into()))
}

/// Delete a user and return it as it was
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = USERS_TAG,
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Deleted user", body = UserResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn delete_user(
    State(service): State<Arc<UserService>>,
    Authenticated(claims): Authenticated,
    headers: HeaderMap,
    IdPath(id): IdPath,
) -> Result<Json<UserResponse>, AppError> {
    let caller = authorized(&service, &claims, &[Capability::AccessAccount(id)]).await?;
    let deleted = service.delete(id).await?;

    AuditEvent::new(Some(caller.id), "user.delete", AuditOutcome::Success)
        .with_resource("user", id)
        .with_request(&headers)
        .log();

    Ok(Json(deleted.into()))
}
