//! Staff account data model.
//!
//! Accounts are created by an account-management collaborator; the custody
//! core only reads them to authenticate callers and to snapshot full names
//! into the loan ledger.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum length of a first or last name once trimmed.
pub const NAME_MAX: usize = 50;
/// Maximum length of a login once trimmed.
pub const LOGIN_MAX: usize = 50;
/// Maximum length of a position title once trimmed.
pub const POSITION_MAX: usize = 255;
/// Maximum length of a telephone number once trimmed.
pub const TELEPHONE_MAX: usize = 15;

/// Validation errors returned by the account constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// A required text field was blank.
    #[error("{field} must not be empty")]
    Empty {
        /// Field name.
        field: &'static str,
    },
    /// A text field exceeded its maximum length.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Field name.
        field: &'static str,
        /// Maximum permitted characters.
        max: usize,
    },
    /// A role string did not match any known role.
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

fn bounded(field: &'static str, raw: &str, max: usize) -> Result<String, UserValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UserValidationError::Empty { field });
    }
    if trimmed.chars().count() > max {
        return Err(UserValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

/// Database identifier of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Capability tier of an account.
///
/// Capabilities nest: `Admin` can do everything `Manager` can, and
/// `Manager` everything `Employee` can. See
/// [`crate::domain::authorization`] for the operation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Full control, including manager accounts.
    Admin,
    /// Manages employees, keys, and notification recipients.
    Manager,
    /// May borrow and return keys.
    Employee,
}

impl Role {
    /// Stored and serialised form (`ADMIN`, `MANAGER`, `EMPLOYEE`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Manager => "MANAGER",
            Self::Employee => "EMPLOYEE",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "MANAGER" => Ok(Self::Manager),
            "EMPLOYEE" => Ok(Self::Employee),
            other => Err(UserValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// A person's first and last name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName {
    first: String,
    last: String,
}

impl PersonName {
    /// Validate and trim both name parts.
    pub fn new(first: &str, last: &str) -> Result<Self, UserValidationError> {
        Ok(Self {
            first: bounded("first name", first, NAME_MAX)?,
            last: bounded("last name", last, NAME_MAX)?,
        })
    }

    /// First name.
    pub fn first_name(&self) -> &str {
        &self.first
    }

    /// Last name.
    pub fn last_name(&self) -> &str {
        &self.last
    }

    /// `"<first> <last>"`, the form recorded in the loan ledger.
    #[must_use]
    pub fn full(&self) -> String {
        format!("{} {}", self.first, self.last)
    }
}

/// Contact and job details carried on an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffProfile {
    /// Job title.
    pub position: String,
    /// Contact telephone number.
    pub telephone: String,
}

impl StaffProfile {
    /// Validate and trim profile fields.
    pub fn new(position: &str, telephone: &str) -> Result<Self, UserValidationError> {
        Ok(Self {
            position: bounded("position", position, POSITION_MAX)?,
            telephone: bounded("telephone", telephone, TELEPHONE_MAX)?,
        })
    }
}

/// Stored salted password digest and the salt used to produce it.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredPassword {
    /// Encoded digest.
    pub hash: String,
    /// Encoded salt.
    pub salt: String,
}

impl fmt::Debug for StoredPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredPassword").finish_non_exhaustive()
    }
}

/// Account fields supplied when creating a user (no id yet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserAccount {
    /// First and last name.
    pub name: PersonName,
    /// Unique login.
    pub login: String,
    /// Salted password digest.
    pub password: StoredPassword,
    /// Capability tier.
    pub role: Role,
    /// Position and telephone.
    pub profile: StaffProfile,
}

impl NewUserAccount {
    /// Validate the login and assemble a new account.
    pub fn new(
        name: PersonName,
        login: &str,
        password: StoredPassword,
        role: Role,
        profile: StaffProfile,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            name,
            login: bounded("login", login, LOGIN_MAX)?,
            password,
            role,
            profile,
        })
    }
}

/// Persisted staff account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Database identifier.
    pub id: UserId,
    /// First and last name.
    pub name: PersonName,
    /// Unique login.
    pub login: String,
    /// Salted password digest.
    pub password: StoredPassword,
    /// Capability tier.
    pub role: Role,
    /// Position and telephone.
    pub profile: StaffProfile,
}

impl UserAccount {
    /// Attach a database id to a new account.
    #[must_use]
    pub fn from_new(id: UserId, account: NewUserAccount) -> Self {
        let NewUserAccount {
            name,
            login,
            password,
            role,
            profile,
        } = account;
        Self {
            id,
            name,
            login,
            password,
            role,
            profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ADMIN", Role::Admin)]
    #[case("MANAGER", Role::Manager)]
    #[case("EMPLOYEE", Role::Employee)]
    fn role_parses_stored_form(#[case] raw: &str, #[case] expected: Role) {
        let role: Role = raw.parse().expect("known role");
        assert_eq!(role, expected);
        assert_eq!(role.as_str(), raw);
    }

    #[rstest]
    fn role_rejects_unknown_values() {
        let err = "admin".parse::<Role>().expect_err("roles are case sensitive");
        assert_eq!(err, UserValidationError::UnknownRole("admin".to_owned()));
    }

    #[rstest]
    fn role_serialises_uppercase() {
        let value = serde_json::to_value(Role::Manager).expect("serialise role");
        assert_eq!(value, "MANAGER");
    }

    #[rstest]
    fn person_name_trims_and_joins() {
        let name = PersonName::new("  Alice ", " Smith").expect("valid name");
        assert_eq!(name.full(), "Alice Smith");
    }

    #[rstest]
    #[case("", "Smith", UserValidationError::Empty { field: "first name" })]
    #[case("Alice", "   ", UserValidationError::Empty { field: "last name" })]
    fn person_name_rejects_invalid_parts(
        #[case] first: &str,
        #[case] last: &str,
        #[case] expected: UserValidationError,
    ) {
        assert_eq!(PersonName::new(first, last), Err(expected));
    }

    #[rstest]
    fn person_name_rejects_overlong_parts() {
        let long = "a".repeat(NAME_MAX + 1);
        assert_eq!(
            PersonName::new(&long, "Smith"),
            Err(UserValidationError::TooLong {
                field: "first name",
                max: NAME_MAX
            })
        );
    }

    #[rstest]
    fn stored_password_debug_hides_material() {
        let stored = StoredPassword {
            hash: "secret-hash".to_owned(),
            salt: "secret-salt".to_owned(),
        };
        let rendered = format!("{stored:?}");
        assert!(!rendered.contains("secret"));
    }
}
