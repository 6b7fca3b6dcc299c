//! Default administrator seeding.
//!
//! On startup the service makes sure an `admin` account exists so a fresh
//! deployment can be logged into. Seeding is idempotent: an existing account
//! with that login is left untouched.

use tracing::info;

use super::password::{PasswordError, hash_new_password};
use super::ports::{UserPersistenceError, UserRepository};
use super::user::{NewUserAccount, PersonName, Role, StaffProfile, UserValidationError};

/// Login of the seeded administrator.
pub const DEFAULT_ADMIN_LOGIN: &str = "admin";
const DEFAULT_ADMIN_FIRST_NAME: &str = "Admin";
const DEFAULT_ADMIN_LAST_NAME: &str = "User";
const DEFAULT_ADMIN_POSITION: &str = "ADMIN";
const DEFAULT_ADMIN_TELEPHONE: &str = "+992411002236";

/// What seeding did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminSeedOutcome {
    /// A new administrator account was inserted.
    Created,
    /// An account with the administrator login already existed.
    AlreadyPresent,
}

/// Failures while seeding the administrator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdminSeedError {
    /// Account storage failed.
    #[error(transparent)]
    Persistence(#[from] UserPersistenceError),
    /// The password could not be hashed.
    #[error(transparent)]
    Password(#[from] PasswordError),
    /// The built-in account fields were rejected.
    #[error(transparent)]
    Validation(#[from] UserValidationError),
}

/// Insert the default administrator with `password` unless one exists.
pub async fn ensure_default_admin<U>(
    users: &U,
    password: &str,
) -> Result<AdminSeedOutcome, AdminSeedError>
where
    U: UserRepository + ?Sized,
{
    if users.find_by_login(DEFAULT_ADMIN_LOGIN).await?.is_some() {
        return Ok(AdminSeedOutcome::AlreadyPresent);
    }
    let account = NewUserAccount::new(
        PersonName::new(DEFAULT_ADMIN_FIRST_NAME, DEFAULT_ADMIN_LAST_NAME)?,
        DEFAULT_ADMIN_LOGIN,
        hash_new_password(password)?,
        Role::Admin,
        StaffProfile::new(DEFAULT_ADMIN_POSITION, DEFAULT_ADMIN_TELEPHONE)?,
    )?;
    match users.insert(&account).await {
        Ok(created) => {
            info!(user_id = %created.id, "default administrator seeded");
            Ok(AdminSeedOutcome::Created)
        }
        // Another instance seeded concurrently.
        Err(UserPersistenceError::DuplicateLogin { .. }) => Ok(AdminSeedOutcome::AlreadyPresent),
        Err(err) => Err(err.into()),
    }
}
