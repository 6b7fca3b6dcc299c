//! Wire mapping for everything a key ledger handler can reject.
//!
//! Request-shape failures become `400` with the offending field in
//! `details`, token failures collapse to a single `403` code, and the
//! domain's own [`Error`] picks its status from [`ErrorCode`]. Every body
//! carries at least `{message: <code>}`; internal failures are logged and
//! replaced with a generic message before they leave the process.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use tracing::{debug, error};

use crate::domain::{
    CustodyValidationError, Error, ErrorCode, LoginValidationError, TRACE_ID_HEADER, TokenError,
};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Wire code for a request without a token header.
pub const UNAUTHENTICATED: &str = "unauthenticated";
/// Wire code for a token that fails signature, expiry, or shape checks.
pub const INVALID_TOKEN: &str = "invalid-token";

const REDACTED: &str = "Internal server error";

fn field_error(code: String, field: &str) -> Error {
    Error::invalid_request(code).with_details(json!({ "field": field }))
}

impl From<CustodyValidationError> for Error {
    fn from(err: CustodyValidationError) -> Self {
        let field = match err {
            CustodyValidationError::InvalidKeyId => "keyId",
            CustodyValidationError::MissingReason | CustodyValidationError::ReasonTooLong => {
                "reason"
            }
        };
        field_error(err.to_string(), field)
    }
}

impl From<LoginValidationError> for Error {
    fn from(err: LoginValidationError) -> Self {
        let field = match err {
            LoginValidationError::EmptyLogin => "login",
            LoginValidationError::EmptyPassword => "password",
        };
        field_error(err.to_string(), field)
    }
}

/// The reason stays in the debug log; callers only learn the token was refused.
impl From<TokenError> for Error {
    fn from(reason: TokenError) -> Self {
        debug!(%reason, "token rejected");
        Error::forbidden(INVALID_TOKEN)
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.code() {
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = if matches!(self.code(), ErrorCode::InternalError) {
            error!(message = %self.message(), trace_id = ?self.trace_id(), "internal error");
            let redacted = Error::internal(REDACTED);
            match self.trace_id() {
                Some(id) => redacted.with_trace_id(id.to_owned()),
                None => redacted,
            }
        } else {
            self.clone()
        };

        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = body.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(body)
    }
}

#[cfg(test)]
mod tests;
