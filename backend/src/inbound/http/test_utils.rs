//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use mockable::DefaultClock;

use crate::domain::ports::{FixtureKeyCustodyCommand, FixtureLoginService};
use crate::domain::token::DEFAULT_TOKEN_TTL_MINUTES;
use crate::domain::{Claims, Role, SigningKey, TokenCodec, UserId};

use super::state::HttpState;

/// Token codec with a fixed secret and the real clock.
pub fn test_tokens() -> TokenCodec {
    TokenCodec::new(
        SigningKey::from_secret("http-tests"),
        DEFAULT_TOKEN_TTL_MINUTES,
        Arc::new(DefaultClock),
    )
}

/// State wired to fixture ports.
pub fn test_state() -> HttpState {
    HttpState::new(
        Arc::new(FixtureLoginService),
        Arc::new(FixtureKeyCustodyCommand),
        test_tokens(),
    )
}

/// Claims for a signed-in administrator.
pub fn admin_claims() -> Claims {
    claims_with_role(Role::Admin)
}

/// Claims for a user with `role`.
pub fn claims_with_role(role: Role) -> Claims {
    Claims {
        id: UserId::new(1),
        login: "admin".to_owned(),
        role,
        first_name: "Admin".to_owned(),
        last_name: "User".to_owned(),
    }
}
