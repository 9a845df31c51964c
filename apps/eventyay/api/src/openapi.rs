use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Pulls in the paths each domain documents.
struct DomainDocs;

impl Modify for DomainDocs {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.merge(domain_users::ApiDoc::openapi());
        openapi.merge(domain_events::ApiDoc::openapi());
    }
}

/// Bearer JWT scheme referenced by the protected routes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&DomainDocs, &SecurityAddon),
    components(schemas(axum_helpers::ErrorResponse)),
    info(
        title = "Eventyay API",
        version = "0.1.0",
        description = "User accounts, event types and event creation for Eventyay"
    ),
    servers((url = "/api", description = "API base path"))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_covers_both_domains() {
        let doc = ApiDoc::openapi();

        for path in ["/users", "/users/{id}", "/users/page", "/event-types", "/events"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }

        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("ErrorResponse"));
    }
}
