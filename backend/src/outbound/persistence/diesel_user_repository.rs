//! PostgreSQL-backed `UserRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{NewUserAccount, UserAccount};

use super::error_mapping::{DieselFailure, classify_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error, login: &str) -> UserPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => UserPersistenceError::connection(message),
        DieselFailure::UniqueViolation(_) => UserPersistenceError::duplicate_login(login),
        DieselFailure::Query(message) => UserPersistenceError::query(message),
    }
}

fn new_user_row(account: &NewUserAccount) -> NewUserRow<'_> {
    NewUserRow {
        first_name: account.name.first_name(),
        last_name: account.name.last_name(),
        login: &account.login,
        password_hash: &account.password.hash,
        password_salt: &account.password.salt,
        role: account.role.as_str(),
        position: &account.profile.position,
        telephone: &account.profile.telephone,
    }
}

fn to_account(row: UserRow) -> Result<UserAccount, UserPersistenceError> {
    UserAccount::try_from(row)
        .map_err(|err| UserPersistenceError::query(format!("stored account is invalid: {err}")))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_login(&self, login: &str) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;
        let row = users::table
            .filter(users::login.eq(login))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, login))?;
        row.map(to_account).transpose()
    }

    async fn insert(&self, account: &NewUserAccount) -> Result<UserAccount, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;
        let inserted = diesel::insert_into(users::table)
            .values(&new_user_row(account))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, &account.login))?;
        to_account(inserted)
    }
}
