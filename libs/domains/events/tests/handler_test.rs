//! HTTP behaviour of the event and event-type routes

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    middleware,
};
use axum_helpers::{AppError, CallerResolver, JwtAuth, JwtClaims, JwtConfig, Principal, jwt_auth_middleware};
use domain_events::{EventService, EventTypeService, EventsState, Geocoder, router};
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use serde_json::{Value, json};
use std::sync::Arc;
use test_utils::TestDatabase;
use tower::ServiceExt;

const SECRET: &str = "event-handler-tests-secret-0123456789";

struct Caller {
    id: i32,
    staff: bool,
}

impl Principal for Caller {
    fn principal_id(&self) -> i32 {
        self.id
    }

    fn is_staff(&self) -> bool {
        self.staff
    }
}

/// Resolves callers straight from the `users` table
struct UsersTable(DatabaseConnection);

#[async_trait]
impl CallerResolver for UsersTable {
    type Caller = Caller;

    async fn resolve(&self, claims: &JwtClaims) -> Result<Caller, AppError> {
        let id = claims.user_id()?;
        let row = self
            .0
            .query_one(Statement::from_sql_and_values(
                self.0.get_database_backend(),
                "SELECT is_admin FROM users WHERE id = $1",
                [id.into()],
            ))
            .await?
            .ok_or_else(|| AppError::Unauthorized("unknown user".to_string()))?;
        Ok(Caller {
            id,
            staff: row.try_get::<bool>("", "is_admin")?,
        })
    }
}

struct FixedGeocoder(Option<&'static str>);

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn searchable_location_name(&self, _: f64, _: f64) -> Option<String> {
        self.0.map(str::to_string)
    }
}

struct Harness {
    _db: TestDatabase,
    app: Router,
    admin: String,
    member: String,
}

async fn harness() -> Harness {
    let db = TestDatabase::new().await;
    let conn = db.connection();
    let auth = JwtAuth::new(&JwtConfig::new(SECRET.to_string()).unwrap());

    let admin = auth
        .create_token(db.insert_user("admin@example.com", true).await)
        .unwrap();
    let member = auth
        .create_token(db.insert_user("member@example.com", false).await)
        .unwrap();

    let state = EventsState {
        event_types: EventTypeService::new(conn.clone()),
        events: EventService::new(conn.clone(), Arc::new(FixedGeocoder(Some("Berlin")))),
        callers: Arc::new(UsersTable(conn)),
    };
    let app = router(state).layer(middleware::from_fn_with_state(auth, jwt_auth_middleware));

    Harness {
        _db: db,
        app,
        admin,
        member,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_api(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/vnd.api+json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn wizard(token: &str, form: &str) -> Request<Body> {
    Request::post("/events")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(form.to_string()))
        .unwrap()
}

fn event_type_doc(name: &str) -> Value {
    json!({ "data": { "type": "event-type", "attributes": { "name": name } } })
}

#[tokio::test]
async fn test_empty_collection_is_json_api() {
    let h = harness().await;

    let response = h.app.clone().oneshot(get("/event-types")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.api+json"
    );

    let (_, body) = send(&h.app, get("/event-types")).await;
    assert_eq!(body["meta"]["count"], 0);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_staff_creates_event_type() {
    let h = harness().await;

    let (status, body) = send(
        &h.app,
        json_api("POST", "/event-types", Some(&h.admin), event_type_doc("Tech Conference")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["type"], "event-type");
    assert_eq!(body["data"]["attributes"]["slug"], "tech-conference");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&h.app, get(&format!("/event-types/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["attributes"]["name"], "Tech Conference");
}

#[tokio::test]
async fn test_event_type_writes_require_staff() {
    let h = harness().await;

    let (status, _) = send(
        &h.app,
        json_api("POST", "/event-types", None, event_type_doc("Workshop")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &h.app,
        json_api("POST", "/event-types", Some(&h.member), event_type_doc("Workshop")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_wrong_resource_type_conflicts() {
    let h = harness().await;

    let (status, body) = send(
        &h.app,
        json_api(
            "POST",
            "/event-types",
            Some(&h.admin),
            json!({ "data": { "type": "event", "attributes": { "name": "Meetup" } } }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "RESOURCE_TYPE_MISMATCH");
}

#[tokio::test]
async fn test_missing_name_is_field_error() {
    let h = harness().await;

    let (status, body) = send(
        &h.app,
        json_api(
            "POST",
            "/event-types",
            Some(&h.admin),
            json!({ "data": { "type": "event-type", "attributes": {} } }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["name"][0], "is required");
}

#[tokio::test]
async fn test_patch_renames_and_checks_id() {
    let h = harness().await;
    let (_, created) = send(
        &h.app,
        json_api("POST", "/event-types", Some(&h.admin), event_type_doc("Talk")),
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let rename = json!({
        "data": { "type": "event-type", "id": id, "attributes": { "name": "Lightning Talk" } }
    });
    let (status, body) = send(
        &h.app,
        json_api("PATCH", &format!("/event-types/{id}"), Some(&h.admin), rename),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["attributes"]["slug"], "lightning-talk");

    let mismatched = json!({
        "data": { "type": "event-type", "id": "999", "attributes": { "name": "Other" } }
    });
    let (status, _) = send(
        &h.app,
        json_api("PATCH", &format!("/event-types/{id}"), Some(&h.admin), mismatched),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_event_type() {
    let h = harness().await;
    let (_, created) = send(
        &h.app,
        json_api("POST", "/event-types", Some(&h.admin), event_type_doc("Social")),
    )
    .await;
    let uri = format!("/event-types/{}", created["data"]["id"].as_str().unwrap());

    let (status, body) = send(&h.app, json_api("DELETE", &uri, Some(&h.admin), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["message"], "Object successfully deleted");

    let (status, _) = send(&h.app, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wizard_creates_event_with_location() {
    let h = harness().await;
    let (_, created) = send(
        &h.app,
        json_api("POST", "/event-types", Some(&h.admin), event_type_doc("Meetup")),
    )
    .await;
    let type_id = created["data"]["id"].as_str().unwrap().to_string();

    let form = format!(
        "name=Rust+Berlin&start_date=01/15/2024&start_time=18:30&end_date=01/15/2024\
         &end_time=21:00&timezone=Europe/Berlin&latitude=52.52&longitude=13.405\
         &event_type_id={type_id}"
    );
    let (status, event) = send(&h.app, wizard(&h.member, &form)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(event["name"], "Rust Berlin");
    assert_eq!(event["starts_at"], "2024-01-15T18:30:00");
    assert_eq!(event["searchable_location_name"], "Berlin");

    let (status, fetched) = send(&h.app, get(&format!("/events/{}", event["id"]))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, event);

    let (_, by_type) = send(&h.app, get(&format!("/events?event_type_id={type_id}"))).await;
    assert_eq!(by_type.as_array().unwrap().len(), 1);

    let (_, related) = send(&h.app, get(&format!("/event-types/{type_id}/events"))).await;
    assert_eq!(related[0]["id"], event["id"]);
}

#[tokio::test]
async fn test_wizard_reports_unparseable_dates() {
    let h = harness().await;

    let (status, body) = send(
        &h.app,
        wizard(
            &h.member,
            "name=Broken&start_date=13/45/2024&start_time=14:30&end_date=01/15/2024&end_time=15:00",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["start"].is_array());
    assert!(body["details"].get("end").is_none());
}

#[tokio::test]
async fn test_wizard_requires_authentication() {
    let h = harness().await;

    let request = Request::post("/events")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("name=Anonymous"))
        .unwrap();
    let (status, _) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_event_filter_is_field_error() {
    let h = harness().await;

    let (status, body) = send(&h.app, get("/events?event_type_id=first")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["details"]["event_type_id"].is_array());
}

#[tokio::test]
async fn test_event_type_slug_keeps_accents_and_needs_a_letter() {
    let h = harness().await;

    let (status, body) = send(
        &h.app,
        json_api("POST", "/event-types", Some(&h.admin), event_type_doc("Café Meetup")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["attributes"]["slug"], "café-meetup");

    let (status, body) = send(
        &h.app,
        json_api("POST", "/event-types", Some(&h.admin), event_type_doc("!!!")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["details"]["name"][0],
        "must contain at least one letter or digit"
    );
}
