//! Borrow and receive handlers.
//!
//! ```text
//! POST /api/table/borrow   {"keyId":"K001","reason":"inspection"}
//! POST /api/table/receiver {"keyId":"K001"}
//! ```
//!
//! Both reply `{"message":"ok"}` once the transition has committed; the
//! notification fan-out continues in the background.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, KeyId, LoanReason};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::state::HttpState;

/// Borrow request body. Accepts the legacy `bs_id` / `prichina` names.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowKeyRequest {
    #[serde(default, alias = "bs_id")]
    pub key_id: String,
    #[serde(default, alias = "prichina")]
    pub reason: String,
}

/// Receive request body. Accepts the legacy `bsId` name.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveKeyRequest {
    #[serde(default, alias = "bsId")]
    pub key_id: String,
}

/// Acknowledgement body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Acknowledgement {
    #[schema(example = "ok")]
    pub message: String,
}

impl Acknowledgement {
    fn ok() -> Self {
        Self {
            message: "ok".to_owned(),
        }
    }
}

/// Take a key out of the cabinet.
#[utoipa::path(
    post,
    path = "/api/table/borrow",
    request_body = BorrowKeyRequest,
    responses(
        (status = 200, description = "Loan opened", body = Acknowledgement),
        (status = 400, description = "Invalid key id or reason", body = Error),
        (status = 403, description = "Missing or invalid token, or role denied", body = Error),
        (status = 404, description = "Unknown key", body = Error),
        (status = 409, description = "Key is borrowed", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["custody"],
    operation_id = "borrowKey"
)]
#[post("/table/borrow")]
pub async fn borrow_key(
    state: web::Data<HttpState>,
    actor: Authenticated,
    payload: web::Json<BorrowKeyRequest>,
) -> ApiResult<web::Json<Acknowledgement>> {
    let BorrowKeyRequest { key_id, reason } = payload.into_inner();
    // Reason is validated before the key id.
    let reason = LoanReason::parse(&reason)?;
    let key_id = KeyId::parse(&key_id)?;
    state.custody.borrow(actor.claims(), key_id, reason).await?;
    Ok(web::Json(Acknowledgement::ok()))
}

/// Accept a key back into the cabinet.
#[utoipa::path(
    post,
    path = "/api/table/receiver",
    request_body = ReceiveKeyRequest,
    responses(
        (status = 200, description = "Loan closed", body = Acknowledgement),
        (status = 400, description = "Invalid key id", body = Error),
        (status = 403, description = "Missing or invalid token, or role denied", body = Error),
        (status = 404, description = "Unknown key", body = Error),
        (status = 409, description = "Key is received", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["custody"],
    operation_id = "receiveKey"
)]
#[post("/table/receiver")]
pub async fn receive_key(
    state: web::Data<HttpState>,
    actor: Authenticated,
    payload: web::Json<ReceiveKeyRequest>,
) -> ApiResult<web::Json<Acknowledgement>> {
    let key_id = KeyId::parse(&payload.key_id)?;
    state.custody.receive(actor.claims(), key_id).await?;
    Ok(web::Json(Acknowledgement::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FixtureLoginService, KeyCustodyCommand};
    use crate::domain::{Claims, CustodyEvent};
    use crate::inbound::http::test_utils::{admin_claims, test_state, test_tokens};
    use actix_web::http::StatusCode;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::{App, test};
    use async_trait::async_trait;
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::sync::Arc;

    struct RejectingCommand(Error);

    #[async_trait]
    impl KeyCustodyCommand for RejectingCommand {
        async fn borrow(&self, _: &Claims, _: KeyId, _: LoanReason) -> Result<CustodyEvent, Error> {
            Err(self.0.clone())
        }

        async fn receive(&self, _: &Claims, _: KeyId) -> Result<CustodyEvent, Error> {
            Err(self.0.clone())
        }
    }

    async fn post(state: HttpState, uri: &str, body: Value, authorized: bool) -> (StatusCode, Value) {
        let token = state.tokens.issue(&admin_claims()).expect("token");
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).service(
                web::scope("/api")
                    .service(borrow_key)
                    .service(receive_key),
            ),
        )
        .await;
        let mut req = test::TestRequest::post().uri(uri).set_json(body);
        if authorized {
            req = req.insert_header((AUTHORIZATION, token));
        }
        let res = test::call_service(&app, req.to_request()).await;
        let status = res.status();
        let body: Value = test::read_body_json(res).await;
        (status, body)
    }

    fn rejecting_state(error: Error) -> HttpState {
        HttpState::new(
            Arc::new(FixtureLoginService),
            Arc::new(RejectingCommand(error)),
            test_tokens(),
        )
    }

    #[rstest]
    #[case(json!({"keyId": "K001", "reason": "inspection"}))]
    #[case(json!({"bs_id": "K001", "prichina": "inspection"}))]
    #[actix_web::test]
    async fn borrow_acknowledges_with_ok(#[case] body: Value) {
        let (status, body) = post(test_state(), "/api/table/borrow", body, true).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "ok"}));
    }

    #[rstest]
    #[case(json!({"keyId": "K001"}))]
    #[case(json!({"bsId": "K001"}))]
    #[actix_web::test]
    async fn receive_acknowledges_with_ok(#[case] body: Value) {
        let (status, body) = post(test_state(), "/api/table/receiver", body, true).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "ok"}));
    }

    #[rstest]
    #[case(json!({"keyId": "K001", "reason": ""}), "required string")]
    #[case(json!({"keyId": "K001", "reason": "   "}), "required string")]
    #[case(json!({"keyId": "K001"}), "required string")]
    #[case(json!({"keyId": "K1", "reason": "inspection"}), "invalid-keyId")]
    #[case(json!({"keyId": "K001", "reason": "x".repeat(256)}), "invalid-reason")]
    #[actix_web::test]
    async fn borrow_validation_failures(#[case] body: Value, #[case] code: &str) {
        let (status, body) = post(test_state(), "/api/table/borrow", body, true).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], code);
    }

    #[actix_web::test]
    async fn receive_rejects_malformed_key_id() {
        let (status, body) =
            post(test_state(), "/api/table/receiver", json!({"keyId": "K00001"}), true).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "invalid-keyId");
    }

    #[rstest]
    #[case("/api/table/borrow", json!({"keyId": "K001", "reason": "inspection"}))]
    #[case("/api/table/receiver", json!({"keyId": "K001"}))]
    #[actix_web::test]
    async fn custody_requires_a_token(#[case] uri: &str, #[case] body: Value) {
        let (status, body) = post(test_state(), uri, body, false).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "unauthenticated");
    }

    #[rstest]
    #[case(Error::conflict("Key is borrowed"), StatusCode::CONFLICT)]
    #[case(Error::not_found("key-not-found"), StatusCode::NOT_FOUND)]
    #[case(Error::forbidden("unauthorized"), StatusCode::FORBIDDEN)]
    #[actix_web::test]
    async fn borrow_surfaces_command_errors(#[case] error: Error, #[case] expected: StatusCode) {
        let message = error.message().to_owned();
        let (status, body) = post(
            rejecting_state(error),
            "/api/table/borrow",
            json!({"keyId": "K001", "reason": "inspection"}),
            true,
        )
        .await;
        assert_eq!(status, expected);
        assert_eq!(body["message"], message.as_str());
    }

    #[actix_web::test]
    async fn receive_surfaces_conflict() {
        let (status, body) = post(
            rejecting_state(Error::conflict("Key is received")),
            "/api/table/receiver",
            json!({"keyId": "K001"}),
            true,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "Key is received");
    }
}
