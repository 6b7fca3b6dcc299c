//! HTTP inbound adapter exposing REST endpoints.

use actix_web::{Scope, web};

pub mod auth;
pub mod custody;
pub mod error;
pub mod health;
pub mod login;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;

pub use error::ApiResult;

/// The `/api` scope with login and custody routes.
///
/// Handlers expect `web::Data<state::HttpState>` in app data.
pub fn api_scope() -> Scope {
    web::scope("/api")
        .service(login::login)
        .service(custody::borrow_key)
        .service(custody::receive_key)
}
