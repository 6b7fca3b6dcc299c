//! Credential verification and session issuance.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::auth::{AuthenticationError, Claims, LoginCredentials, Session};
use super::error::Error;
use super::password::{PasswordError, verify_password};
use super::ports::{LoginService, UserPersistenceError, UserRepository};
use super::token::{TokenCodec, TokenError};

/// Failures while exchanging credentials for a session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    /// Unknown login or wrong password.
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),
    /// Account lookup failed.
    #[error(transparent)]
    Persistence(#[from] UserPersistenceError),
    /// Stored password material could not be used.
    #[error(transparent)]
    Password(#[from] PasswordError),
    /// Token could not be signed.
    #[error(transparent)]
    Token(#[from] TokenError),
    /// The digest task was cancelled.
    #[error("password verification task failed: {0}")]
    Task(String),
}

impl From<LoginError> for Error {
    fn from(error: LoginError) -> Self {
        match error {
            LoginError::Authentication(reason) => Self::invalid_request(reason.to_string()),
            LoginError::Persistence(UserPersistenceError::Connection { message }) => {
                Self::service_unavailable(format!("user storage unavailable: {message}"))
            }
            other => Self::internal(other.to_string()),
        }
    }
}

/// Login use-case backed by a user repository and a token codec.
pub struct CredentialService<U> {
    users: Arc<U>,
    tokens: TokenCodec,
}

impl<U> CredentialService<U>
where
    U: UserRepository,
{
    /// Create a new service.
    pub fn new(users: Arc<U>, tokens: TokenCodec) -> Self {
        Self { users, tokens }
    }

    /// Verify credentials and return the identity claims.
    pub async fn verify(&self, credentials: &LoginCredentials) -> Result<Claims, LoginError> {
        let account = self
            .users
            .find_by_login(credentials.login())
            .await?
            .ok_or(AuthenticationError::UnknownUser)?;

        let password = zeroize::Zeroizing::new(credentials.password().to_owned());
        let stored = account.password.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .map_err(|err| LoginError::Task(err.to_string()))??;
        if !matches {
            debug!(login = %account.login, "password mismatch");
            return Err(AuthenticationError::BadCredentials.into());
        }
        Ok(Claims::from(&account))
    }
}

#[async_trait]
impl<U> LoginService for CredentialService<U>
where
    U: UserRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Session, Error> {
        let claims = self.verify(credentials).await.map_err(Error::from)?;
        let token = self
            .tokens
            .issue(&claims)
            .map_err(|err| Error::from(LoginError::from(err)))?;
        info!(user_id = %claims.id, role = %claims.role, "session issued");
        Ok(Session { token, claims })
    }
}
