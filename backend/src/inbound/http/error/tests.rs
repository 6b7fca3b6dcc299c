//! Tests for HTTP error mapping.

use super::*;
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::invalid_request("invalid-keyId"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("invalid-token"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("key-not-found"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("Key is borrowed"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

async fn response_body(error: &Error) -> (StatusCode, Option<String>, Value) {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .map(|value| value.to_str().expect("ascii header").to_owned());
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let body = serde_json::from_slice(&bytes).expect("JSON body");
    (status, header, body)
}

#[rstest]
#[actix_web::test]
async fn conflict_body_carries_wire_code_and_trace_id(expected_trace_id: String) {
    let error = Error::conflict("Key is borrowed").with_trace_id(expected_trace_id.clone());

    let (status, header, body) = response_body(&error).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(header.as_deref(), Some(expected_trace_id.as_str()));
    assert_eq!(body["message"], "Key is borrowed");
    assert_eq!(body["code"], "conflict");
    assert_eq!(body["traceId"], expected_trace_id.as_str());
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(expected_trace_id: String) {
    let error = Error::internal("custody storage error: deadlock detected")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({"secret": "x"}));

    let (status, header, body) = response_body(&error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(expected_trace_id.as_str()));
    assert_eq!(body["message"], "Internal server error");
    assert!(body.get("details").is_none());
}

#[rstest]
#[actix_web::test]
async fn error_without_trace_id_omits_trace_header() {
    let error = Error::invalid_request("required string").with_details(json!({"field": "reason"}));

    let (status, header, body) = response_body(&error).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(header.is_none());
    assert!(body.get("traceId").is_none());
    assert_eq!(body["details"], json!({"field": "reason"}));
}

#[rstest]
#[case(CustodyValidationError::InvalidKeyId, "invalid-keyId", "keyId")]
#[case(CustodyValidationError::MissingReason, "required string", "reason")]
#[case(CustodyValidationError::ReasonTooLong, "invalid-reason", "reason")]
fn custody_input_errors_name_the_field(
    #[case] err: CustodyValidationError,
    #[case] code: &str,
    #[case] field: &str,
) {
    let error = Error::from(err);

    assert_eq!(ResponseError::status_code(&error), StatusCode::BAD_REQUEST);
    assert_eq!(error.message(), code);
    assert_eq!(error.details(), Some(&json!({ "field": field })));
}

#[rstest]
#[case(LoginValidationError::EmptyLogin, "invalid-login", "login")]
#[case(LoginValidationError::EmptyPassword, "invalid-password", "password")]
fn login_input_errors_name_the_field(
    #[case] err: LoginValidationError,
    #[case] code: &str,
    #[case] field: &str,
) {
    let error = Error::from(err);

    assert_eq!(ResponseError::status_code(&error), StatusCode::BAD_REQUEST);
    assert_eq!(error.message(), code);
    assert_eq!(error.details(), Some(&json!({ "field": field })));
}

#[rstest]
#[case(TokenError::Missing)]
#[case(TokenError::Malformed)]
#[case(TokenError::BadSignature)]
#[case(TokenError::Expired)]
fn every_token_failure_is_the_same_forbidden_code(#[case] reason: TokenError) {
    let error = Error::from(reason);

    assert_eq!(ResponseError::status_code(&error), StatusCode::FORBIDDEN);
    assert_eq!(error.message(), INVALID_TOKEN);
    assert!(error.details().is_none());
}
