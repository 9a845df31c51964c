use super::jwt::{AuthError, JwtAuth, JwtClaims};
use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};

/// Reason a presented token was not accepted, kept for the [`Authenticated`] rejection
#[derive(Debug, Clone)]
struct TokenRejected(String);

/// Bearer token from the Authorization header, falling back to the `access_token` cookie
fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        let (name, value) = cookie.trim().split_once('=')?;
                        (name == "access_token").then(|| value.to_string())
                    })
                })
        })
}

/// Verifies the request's token, if any, and stores its [`JwtClaims`] in the
/// request extensions. Requests without a valid token pass through anonymously;
/// handlers that need a caller demand one with the [`Authenticated`] extractor.
///
/// ```ignore
/// let api = Router::new()
///     .merge(users::router(state))
///     .layer(axum::middleware::from_fn_with_state(jwt_auth, jwt_auth_middleware));
/// ```
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token(request.headers()) {
        match auth.verify_token(&token) {
            Ok(claims) => {
                request.extensions_mut().insert(claims);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Rejected bearer token");
                request.extensions_mut().insert(TokenRejected(e.to_string()));
            }
        }
    }

    next.run(request).await
}

/// Claims of the authenticated caller; rejects with 401 when the request carried
/// no valid token.
#[derive(Debug, Clone)]
pub struct Authenticated(pub JwtClaims);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<JwtClaims>() {
            return Ok(Authenticated(claims.clone()));
        }

        let err = match parts.extensions.get::<TokenRejected>() {
            Some(TokenRejected(reason)) => AuthError::InvalidToken(reason.clone()),
            None => AuthError::MissingToken,
        };
        Err(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;
    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
    use tower::ServiceExt;

    fn app(auth: JwtAuth) -> Router {
        Router::new()
            .route(
                "/me",
                get(|Authenticated(claims): Authenticated| async move { claims.sub }),
            )
            .route("/open", get(|| async { "hello" }))
            .layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware))
    }

    fn jwt() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("middleware-test-secret-of-32-characters").unwrap())
    }

    #[test]
    fn test_extract_token_from_header_and_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "theme=dark; access_token=abc".parse().unwrap());
        assert_eq!(extract_token(&headers).as_deref(), Some("abc"));

        headers.insert(header::AUTHORIZATION, "Bearer xyz".parse().unwrap());
        assert_eq!(extract_token(&headers).as_deref(), Some("xyz"));
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let auth = jwt();
        let token = auth.create_token(7).unwrap();

        let response = app(auth)
            .oneshot(
                Request::get("/me")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_or_bad_token_is_401_only_where_required() {
        let response = app(jwt())
            .oneshot(Request::get("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(jwt())
            .oneshot(
                Request::get("/me")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(jwt())
            .oneshot(
                Request::get("/open")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
