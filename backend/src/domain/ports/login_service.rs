//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call it to exchange credentials for a signed session
//! without knowing the backing infrastructure, so handler tests can
//! substitute a double instead of wiring persistence.

use async_trait::async_trait;

use crate::domain::{Claims, Error, LoginCredentials, Role, Session, UserId};

/// Domain use-case port for authentication.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and issue a session token.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Session, Error>;
}

/// In-memory authenticator accepting `admin` / `admin` only.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Session, Error> {
        if credentials.login() != "admin" {
            return Err(Error::invalid_request("user is undefined"));
        }
        if credentials.password() != "admin" {
            return Err(Error::invalid_request("invalid"));
        }
        Ok(Session {
            token: "fixture-token".to_owned(),
            claims: Claims {
                id: UserId::new(1),
                login: "admin".to_owned(),
                role: Role::Admin,
                first_name: "Admin".to_owned(),
                last_name: "User".to_owned(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("admin", "admin", None)]
    #[case("admin", "wrong", Some("invalid"))]
    #[case("other", "admin", Some("user is undefined"))]
    #[tokio::test]
    async fn fixture_login_service_reports_wire_codes(
        #[case] login: &str,
        #[case] password: &str,
        #[case] expected_error: Option<&str>,
    ) {
        let creds = LoginCredentials::try_from_parts(login, password).expect("credentials shape");
        let result = FixtureLoginService.authenticate(&creds).await;
        match (expected_error, result) {
            (None, Ok(session)) => assert_eq!(session.claims.role, Role::Admin),
            (Some(code), Err(err)) => assert_eq!(err.message(), code),
            (None, Err(err)) => panic!("expected success, got error: {err:?}"),
            (Some(code), Ok(session)) => panic!("expected {code}, got session: {session:?}"),
        }
    }
}
