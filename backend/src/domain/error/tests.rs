//! Tests for the error payload constructors and serialisation.

use super::*;
use crate::domain::TraceId;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("unauthenticated"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("unauthorized"), ErrorCode::Forbidden)]
#[case(Error::not_found("key-not-found"), ErrorCode::NotFound)]
#[case(Error::conflict("Key is borrowed"), ErrorCode::Conflict)]
#[case(Error::service_unavailable("db down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_codes(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn new_falls_back_to_code_for_blank_messages() {
    let error = Error::new(ErrorCode::Conflict, "");
    assert_eq!(error.message(), "conflict");
}

#[rstest]
fn new_returns_none_when_trace_id_out_of_scope() {
    let error = Error::internal("boom");
    assert!(error.trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let error = TraceId::scope(trace_id, async move { Error::conflict("Key is received") }).await;

    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}

#[rstest]
fn serialises_message_code_and_details_in_camel_case(expected_trace_id: String) {
    let error = Error::conflict("Key is borrowed")
        .with_trace_id(expected_trace_id)
        .with_details(json!({ "keyId": "K001" }));

    let value = serde_json::to_value(&error).expect("serialise error");

    assert_eq!(value["message"], "Key is borrowed");
    assert_eq!(value["code"], "conflict");
    assert_eq!(value["traceId"], TRACE_ID);
    assert_eq!(value["details"]["keyId"], "K001");
}

#[rstest]
fn omits_absent_optional_fields() {
    let value = serde_json::to_value(Error::invalid_request("required string"))
        .expect("serialise error");

    assert_eq!(value, json!({ "code": "invalid_request", "message": "required string" }));
}
