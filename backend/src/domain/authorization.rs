//! Role-based authorization policy.
//!
//! A pure decision over the caller's claims and the operation category. It
//! runs after token validation and before any storage is touched.

use super::auth::Claims;
use super::user::{Role, UserId};

/// Operation categories gated by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Create, update, or delete manager accounts.
    ManagerAccounts,
    /// Create, update, or delete employee accounts.
    EmployeeAccounts,
    /// Manage the key catalog.
    KeyCatalog,
    /// Manage notification recipients.
    NotificationRecipients,
    /// Borrow or return a key.
    Custody,
    /// Read or update the profile belonging to `owner`.
    OwnProfile {
        /// Account whose profile is being accessed.
        owner: UserId,
    },
}

/// The caller's role does not permit the attempted operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
    /// Access denied.
    #[error("unauthorized")]
    Forbidden,
}

/// Roles permitted to perform `operation`, independent of identity.
#[must_use]
pub fn allowed_roles(operation: Operation) -> &'static [Role] {
    match operation {
        Operation::ManagerAccounts => &[Role::Admin],
        Operation::EmployeeAccounts
        | Operation::KeyCatalog
        | Operation::NotificationRecipients => &[Role::Admin, Role::Manager],
        Operation::Custody | Operation::OwnProfile { .. } => {
            &[Role::Admin, Role::Manager, Role::Employee]
        }
    }
}

/// Decide whether `actor` may perform `operation`.
///
/// # Examples
/// ```
/// use keyledger::domain::{authorize, Claims, Operation, Role, UserId};
///
/// let employee = Claims {
///     id: UserId::new(3),
///     login: "e".into(),
///     role: Role::Employee,
///     first_name: "E".into(),
///     last_name: "Mp".into(),
/// };
/// assert!(authorize(&employee, Operation::Custody).is_ok());
/// assert!(authorize(&employee, Operation::ManagerAccounts).is_err());
/// ```
pub fn authorize(actor: &Claims, operation: Operation) -> Result<(), AuthorizationError> {
    if let Operation::OwnProfile { owner } = operation {
        if owner != actor.id {
            return Err(AuthorizationError::Forbidden);
        }
    }
    if allowed_roles(operation).contains(&actor.role) {
        Ok(())
    } else {
        Err(AuthorizationError::Forbidden)
    }
}
