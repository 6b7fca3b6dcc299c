//! Driven port for reading and creating staff accounts.

use async_trait::async_trait;

use crate::domain::{NewUserAccount, UserAccount, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the login.
        DuplicateLogin { login: String } => "login already exists: {login}",
    }
}

/// Port for account lookups used by authentication and seeding.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch the account with the given login.
    async fn find_by_login(&self, login: &str) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Insert a new account and return it with its assigned id.
    async fn insert(&self, account: &NewUserAccount) -> Result<UserAccount, UserPersistenceError>;
}

/// Fixture repository that holds no accounts and echoes inserts.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn find_by_login(
        &self,
        _login: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        Ok(None)
    }

    async fn insert(&self, account: &NewUserAccount) -> Result<UserAccount, UserPersistenceError> {
        Ok(UserAccount::from_new(UserId::new(1), account.clone()))
    }
}
