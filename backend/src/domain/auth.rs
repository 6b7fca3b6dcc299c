//! Authentication primitives: login credentials, identity claims, and the
//! authenticated session handed back to callers.
//!
//! Inbound payload parsing stays outside the domain; handlers build
//! [`LoginCredentials`] through the validating constructor before talking to
//! the [`crate::domain::ports::LoginService`] port.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::user::{Role, UserAccount, UserId};

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Login was missing or blank once trimmed.
    #[error("invalid-login")]
    EmptyLogin,
    /// Password was blank.
    #[error("invalid-password")]
    EmptyPassword,
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `login` is trimmed and must not be empty after trimming.
/// - `password` must be non-empty but keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use keyledger::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" admin ", "secret").unwrap();
/// assert_eq!(creds.login(), "admin");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    login: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw login/password inputs.
    pub fn try_from_parts(login: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = login.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyLogin);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            login: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Login used for the account lookup.
    pub fn login(&self) -> &str {
        self.login.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Why a login attempt was refused.
///
/// The two variants are reported distinctly (`user is undefined` versus
/// `invalid`), which lets a caller discover which logins exist. Collapsing them
/// into one code would be a hardening option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthenticationError {
    /// No account has the supplied login.
    #[error("user is undefined")]
    UnknownUser,
    /// The password digest did not match.
    #[error("invalid")]
    BadCredentials,
}

/// Identity carried inside a session token.
///
/// Serialised field names match the token payload:
/// `{id, login, role, firstName, lastName}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Account id.
    pub id: UserId,
    /// Account login.
    pub login: String,
    /// Capability tier.
    pub role: Role,
    /// First name at the time of login.
    pub first_name: String,
    /// Last name at the time of login.
    pub last_name: String,
}

impl Claims {
    /// `"<first> <last>"` as recorded in the loan ledger.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl From<&UserAccount> for Claims {
    fn from(account: &UserAccount) -> Self {
        Self {
            id: account.id,
            login: account.login.clone(),
            role: account.role,
            first_name: account.name.first_name().to_owned(),
            last_name: account.name.last_name().to_owned(),
        }
    }
}

/// Result of a successful login: the signed token and the identity it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Signed, time-limited token to present on later requests.
    pub token: String,
    /// Identity encoded in the token.
    pub claims: Claims,
}
