//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the login, custody, and health endpoints together
//! with the raw-token header security scheme. Swagger UI serves it in debug
//! builds and `cargo run --bin openapi-dump` prints it for tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, Role};
use crate::inbound::http::custody::{Acknowledgement, BorrowKeyRequest, ReceiveKeyRequest};
use crate::inbound::http::login::{LoginRequest, LoginResponse};

/// Name of the token security scheme in the generated document.
pub const TOKEN_SECURITY_SCHEME: &str = "TokenHeader";

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            TOKEN_SECURITY_SCHEME,
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "Raw token returned by POST /api/auth/login, sent without a scheme prefix.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Key ledger API",
        description = "Login and custody transitions for physical site keys."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("TokenHeader" = [])),
    paths(
        crate::inbound::http::login::login,
        crate::inbound::http::custody::borrow_key,
        crate::inbound::http::custody::receive_key,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        LoginRequest,
        LoginResponse,
        BorrowKeyRequest,
        ReceiveKeyRequest,
        Acknowledgement
    )),
    tags(
        (name = "auth", description = "Credential exchange"),
        (name = "custody", description = "Borrow and return keys"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/api/auth/login")]
    #[case("/api/table/borrow")]
    #[case("/api/table/receiver")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn document_lists_every_route(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn token_header_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key(TOKEN_SECURITY_SCHEME));
    }

    #[rstest]
    #[case("LoginResponse")]
    #[case("BorrowKeyRequest")]
    #[case("Error")]
    fn request_and_response_schemas_are_registered(#[case] name: &str) {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(
            components
                .schemas
                .keys()
                .any(|key| key.rsplit('.').next() == Some(name)),
            "missing schema {name}"
        );
    }
}
