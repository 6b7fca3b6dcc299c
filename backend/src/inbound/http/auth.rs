//! Token authentication for HTTP handlers.
//!
//! Callers present the raw signed token in the `Authorization` header, with
//! no scheme prefix. [`Authenticated`] resolves it to identity claims before
//! the handler body runs; role checks stay in the domain services.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};

use crate::domain::{Claims, Error, TokenError};

use super::error::UNAUTHENTICATED;
use super::state::HttpState;

/// Identity of the caller, taken from a validated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated(pub Claims);

impl Authenticated {
    /// Claims carried by the token.
    pub fn claims(&self) -> &Claims {
        &self.0
    }
}

fn resolve(req: &HttpRequest) -> Result<Authenticated, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("http state is not configured"))?;
    let Some(header) = req.headers().get(AUTHORIZATION) else {
        return Err(Error::forbidden(UNAUTHENTICATED));
    };
    let raw = header.to_str().map_err(|_| TokenError::Malformed)?;
    let claims = state.tokens.validate(raw.trim())?;
    Ok(Authenticated(claims))
}

impl FromRequest for Authenticated {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req).map_err(actix_web::Error::from))
    }
}
