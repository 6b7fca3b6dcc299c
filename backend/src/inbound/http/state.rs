//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::TokenCodec;
use crate::domain::ports::{KeyCustodyCommand, LoginService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Credential exchange.
    pub login: Arc<dyn LoginService>,
    /// Borrow and receive transitions.
    pub custody: Arc<dyn KeyCustodyCommand>,
    /// Validates the token presented on authenticated routes.
    pub tokens: TokenCodec,
}

impl HttpState {
    /// Construct state from explicit port implementations.
    pub fn new(
        login: Arc<dyn LoginService>,
        custody: Arc<dyn KeyCustodyCommand>,
        tokens: TokenCodec,
    ) -> Self {
        Self {
            login,
            custody,
            tokens,
        }
    }
}
