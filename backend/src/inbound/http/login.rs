//! Login handler.
//!
//! ```text
//! POST /api/auth/login {"login":"admin","password":"admin"}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, LoginCredentials, LoginValidationError, Role, Session};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Login request body.
///
/// Missing fields deserialize as empty strings so they surface as the
/// `invalid-login` / `invalid-password` codes rather than a parse failure.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.login, &value.password)
    }
}

/// Successful login payload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Signed token to send back in the `Authorization` header.
    pub token: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

impl From<Session> for LoginResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            first_name: session.claims.first_name,
            last_name: session.claims.last_name,
            role: session.claims.role,
        }
    }
}

/// Exchange credentials for a signed, time-limited token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Invalid input or credentials", body = Error),
        (status = 503, description = "User storage unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let credentials = LoginCredentials::try_from(payload.into_inner())?;
    let session = state.login.authenticate(&credentials).await?;
    Ok(web::Json(session.into()))
}
