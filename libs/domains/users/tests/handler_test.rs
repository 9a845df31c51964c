//! HTTP behaviour of the `/users` routes

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    middleware,
};
use axum_helpers::{JwtAuth, JwtConfig, jwt_auth_middleware};
use domain_events::{assign_role, entity::role};
use domain_users::{UserService, router};
use database::PageBounds;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use test_utils::{TestDataBuilder, TestDatabase};
use tower::ServiceExt;

const SECRET: &str = "user-handler-tests-secret-0123456789";

struct Harness {
    db: TestDatabase,
    auth: JwtAuth,
    app: Router,
    admin: String,
}

async fn harness() -> Harness {
    let db = TestDatabase::new().await;
    let auth = JwtAuth::new(&JwtConfig::new(SECRET.to_string()).unwrap());
    let admin = auth
        .create_token(db.insert_user("admin@example.com", true).await)
        .unwrap();

    let bounds = PageBounds {
        default_size: 10,
        max_size: 50,
    };
    let service = Arc::new(UserService::new(db.connection(), bounds));
    let app = router(service).layer(middleware::from_fn_with_state(
        auth.clone(),
        jwt_auth_middleware,
    ));

    Harness {
        db,
        auth,
        app,
        admin,
    }
}

impl Harness {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    /// Signs up through the API and returns the new id with a token for it.
    async fn sign_up(&self, email: &str) -> (i32, String) {
        let (status, body) = self
            .send(request("POST", "/users", None, Some(json!({ "email": email, "password": "pa55word" }))))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let id = body["id"].as_i64().unwrap() as i32;
        (id, self.auth.create_token(id).unwrap())
    }
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn test_sign_up_returns_profile_without_hash() {
    let h = harness().await;
    let email = TestDataBuilder::from_test_name("sign_up_returns_profile").email("attendee");

    let (status, body) = h
        .send(request("POST", "/users", None, Some(json!({ "email": email, "password": "pa55word" }))))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], email.as_str());
    assert!(body["id"].as_i64().unwrap() > 0);
    assert!(body["signup_time"].is_string());
    assert!(body["user_detail"]["firstname"].is_null());
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_sign_up_validation() {
    let h = harness().await;

    let (status, body) = h
        .send(request("POST", "/users", None, Some(json!({ "password": "pa55word" }))))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["email"].is_array());

    let (status, body) = h
        .send(request("POST", "/users", None, Some(json!({ "email": "not-an-email", "password": "pa55word" }))))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["email"][0], "must be a valid email address");

    let (_, users) = h.send(request("GET", "/users", Some(&h.admin), None)).await;
    assert_eq!(users.as_array().unwrap().len(), 1, "only the seeded admin exists");
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let h = harness().await;
    h.sign_up("twice@example.com").await;

    let (status, body) = h
        .send(request("POST", "/users", None, Some(json!({ "email": "twice@example.com", "password": "other" }))))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_account_routes_require_owner_or_staff() {
    let h = harness().await;
    let (alice, alice_token) = h.sign_up("alice@example.com").await;
    let (_, bob_token) = h.sign_up("bob@example.com").await;
    let uri = format!("/users/{alice}");

    let (status, _) = h.send(request("GET", &uri, None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = h.send(request("GET", &uri, Some("garbage"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = h.send(request("GET", &uri, Some(&bob_token), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    let (status, _) = h.send(request("GET", &uri, Some(&alice_token), None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = h.send(request("GET", &uri, Some(&h.admin), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");
}

#[tokio::test]
async fn test_staff_only_listing() {
    let h = harness().await;
    let (_, token) = h.sign_up("member@example.com").await;

    for uri in ["/users", "/users/page"] {
        let (status, _) = h.send(request("GET", uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");

        let (status, _) = h.send(request("GET", uri, None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn test_missing_user_is_not_found_for_staff() {
    let h = harness().await;

    for method in ["GET", "DELETE"] {
        let (status, _) = h.send(request(method, "/users/4242", Some(&h.admin), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method}");
    }
    let (status, _) = h
        .send(request("PUT", "/users/4242", Some(&h.admin), Some(json!({ "email": "x@example.com" }))))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_partial_update_is_idempotent_and_keeps_other_fields() {
    let h = harness().await;
    let (id, token) = h.sign_up("carol@example.com").await;
    let uri = format!("/users/{id}");
    let patch = json!({
        "user_detail": {
            "firstname": "Carol",
            "twitter": "https://twitter.com/carol"
        }
    });

    let (status, first) = h.send(request("PUT", &uri, Some(&token), Some(patch.clone()))).await;
    assert_eq!(status, StatusCode::OK, "{first}");
    assert_eq!(first["email"], "carol@example.com");
    assert_eq!(first["user_detail"]["firstname"], "Carol");
    assert!(first["user_detail"]["lastname"].is_null());

    let (_, second) = h.send(request("PUT", &uri, Some(&token), Some(patch))).await;
    assert_eq!(first, second);

    let (status, renamed) = h
        .send(request("PUT", &uri, Some(&token), Some(json!({ "email": "carol@example.org", "id": 999 }))))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["id"], id);
    assert_eq!(renamed["email"], "carol@example.org");
    assert_eq!(renamed["user_detail"]["twitter"], "https://twitter.com/carol");
}

#[tokio::test]
async fn test_invalid_nested_field_reports_dotted_path() {
    let h = harness().await;
    let (id, token) = h.sign_up("dave@example.com").await;

    let (status, body) = h
        .send(request(
            "PUT",
            &format!("/users/{id}"),
            Some(&token),
            Some(json!({ "email": "nope", "user_detail": { "twitter": "not a url" } })),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["email"].is_array());
    assert_eq!(body["details"]["user_detail.twitter"][0], "must be a valid URL");
}

#[tokio::test]
async fn test_nested_update_failure_leaves_user_unchanged() {
    let h = harness().await;
    // Rows inserted directly have no detail record, so the nested write fails.
    let id = h.db.insert_user("bare@example.com", false).await;
    let uri = format!("/users/{id}");

    let (status, _) = h
        .send(request(
            "PUT",
            &uri,
            Some(&h.admin),
            Some(json!({ "email": "changed@example.com", "user_detail": { "firstname": "B" } })),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = h.send(request("GET", &uri, Some(&h.admin), None)).await;
    assert_eq!(body["email"], "bare@example.com");
}

#[tokio::test]
async fn test_email_only_update_works_without_detail_row() {
    let h = harness().await;
    let id = h.db.insert_user("plain@example.com", false).await;
    let uri = format!("/users/{id}");

    let (status, body) = h
        .send(request(
            "PUT",
            &uri,
            Some(&h.admin),
            Some(json!({ "email": "renamed@example.com" })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["email"], "renamed@example.com");
    assert!(body["user_detail"]["firstname"].is_null());

    let (_, body) = h.send(request("GET", &uri, Some(&h.admin), None)).await;
    assert_eq!(body["email"], "renamed@example.com");
}

#[tokio::test]
async fn test_delete_returns_user_and_ids_are_not_reused() {
    let h = harness().await;
    let (id, token) = h.sign_up("erin@example.com").await;
    let uri = format!("/users/{id}");

    let (status, body) = h.send(request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "erin@example.com");

    let (status, _) = h.send(request("GET", &uri, Some(&h.admin), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The deleted caller's token no longer resolves.
    let (status, _) = h.send(request("GET", "/users/me", Some(&token), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (next, _) = h.sign_up("frank@example.com").await;
    assert!(next > id);
}

#[tokio::test]
async fn test_pagination_is_stable_and_offset() {
    let h = harness().await;
    for n in 0..24 {
        h.db.insert_user(&format!("user{n:02}@example.com"), false).await;
    }

    let (_, all) = h.send(request("GET", "/users", Some(&h.admin), None)).await;
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 25);

    let first_page = request("GET", "/users/page?page=1&size=10", Some(&h.admin), None);
    let (status, first) = h.send(first_page).await;
    assert_eq!(status, StatusCode::OK);
    let (_, again) = h
        .send(request("GET", "/users/page?page=1&size=10", Some(&h.admin), None))
        .await;
    assert_eq!(first, again);
    assert_eq!(first["total_count"], 25);
    assert_eq!(first["next"], 2);
    assert!(first["previous"].is_null());

    let (_, second) = h
        .send(request("GET", "/users/page?page=2&size=10", Some(&h.admin), None))
        .await;
    assert_eq!(second["results"][0], all[10]);
    assert_eq!(second["previous"], 1);

    let (_, last) = h.send(request("GET", "/users/page?page=3", Some(&h.admin), None)).await;
    assert_eq!(last["results"].as_array().unwrap().len(), 5);
    assert!(last["next"].is_null());

    let (status, body) = h
        .send(request("GET", "/users/page?page=0&size=500", Some(&h.admin), None))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["page"].is_array());
    assert!(body["details"]["size"].is_array());
}

#[tokio::test]
async fn test_malformed_or_oversized_page_is_field_error() {
    let h = harness().await;

    let (status, body) = h
        .send(request("GET", "/users/page?page=abc", Some(&h.admin), None))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["details"]["page"].is_array());

    let (status, body) = h
        .send(request(
            "GET",
            "/users/page?page=922337203685477580&size=50",
            Some(&h.admin),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["page"].is_array());
}

#[tokio::test]
async fn test_me_and_my_events() {
    let h = harness().await;
    let (id, token) = h.sign_up("grace@example.com").await;
    let conn = h.db.connection();

    let organized = h.db.insert_event("Rust Meetup").await;
    let attended = h.db.insert_event("Keynote").await;
    assign_role(&conn, id, organized, role::ORGANIZER).await.unwrap();
    assign_role(&conn, id, attended, role::ATTENDEE).await.unwrap();

    let (status, me) = h.send(request("GET", "/users/me", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], id);

    for uri in ["/users/me/events", "/users/me/tickets"] {
        let (status, events) = h.send(request("GET", uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        let events = events.as_array().unwrap();
        assert_eq!(events.len(), 1, "{uri}");
        assert_eq!(events[0]["name"], "Rust Meetup");

        let (status, _) = h.send(request("GET", uri, None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }
}
