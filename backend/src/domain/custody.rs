//! Key custody model: key ids, loan reasons, ledger records, and the events
//! produced by committed transitions.
//!
//! A key is `Available` or `Borrowed`. The persisted `borrowed` flag is true
//! exactly when one loan record for that key has no return timestamp.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Exact length of a catalog key id.
pub const KEY_ID_LEN: usize = 4;
/// Maximum length of a loan reason once trimmed.
pub const REASON_MAX: usize = 255;

/// Input problems detected before any custody transaction starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CustodyValidationError {
    /// Key id is missing or not exactly four characters.
    #[error("invalid-keyId")]
    InvalidKeyId,
    /// Reason is missing or blank.
    #[error("required string")]
    MissingReason,
    /// Reason exceeds the stored column width.
    #[error("invalid-reason")]
    ReasonTooLong,
}

/// Catalog identifier of a physical key.
///
/// # Examples
/// ```
/// use keyledger::domain::KeyId;
///
/// let id = KeyId::parse(" K001 ").expect("four characters");
/// assert_eq!(id.as_str(), "K001");
/// assert!(KeyId::parse("K1").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct KeyId(String);

impl KeyId {
    /// Trim and validate a raw key id.
    pub fn parse(raw: &str) -> Result<Self, CustodyValidationError> {
        let trimmed = raw.trim();
        if trimmed.chars().count() != KEY_ID_LEN {
            return Err(CustodyValidationError::InvalidKeyId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for KeyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Why a key was taken. Required, non-blank, and bounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanReason(String);

impl LoanReason {
    /// Trim and validate a raw reason.
    pub fn parse(raw: &str) -> Result<Self, CustodyValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CustodyValidationError::MissingReason);
        }
        if trimmed.chars().count() > REASON_MAX {
            return Err(CustodyValidationError::ReasonTooLong);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the reason as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Direction of a custody change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CustodyAction {
    /// The key left the cabinet.
    Take,
    /// The key came back.
    Return,
}

/// Validated input for a borrow transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowRequest {
    /// Key being taken.
    pub key_id: KeyId,
    /// Why it is being taken.
    pub reason: LoanReason,
    /// Full name of the borrower, snapshotted into the ledger.
    pub borrower: String,
}

/// Validated input for a receive transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveRequest {
    /// Key being returned.
    pub key_id: KeyId,
    /// Full name of whoever accepts the key back.
    pub receiver: String,
}

/// Data captured when a transition commits.
///
/// `actor_name` is the borrower for [`CustodyAction::Take`] and the original
/// borrower for [`CustodyAction::Return`], matching the phrasing of the
/// outgoing notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustodyEvent {
    /// Person named in the notification.
    pub actor_name: String,
    /// Key that changed hands.
    pub key_id: KeyId,
    /// Key name snapshot from the loan record.
    pub key_name: String,
    /// Direction of the change.
    pub action: CustodyAction,
    /// Commit timestamp of the transition.
    pub at: DateTime<Utc>,
}

/// Reason a transition was refused inside the atomic unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CustodyConflict {
    /// Borrow attempted on a key that is already out.
    #[error("Key is borrowed")]
    AlreadyBorrowed,
    /// Receive attempted on a key that is not out.
    #[error("Key is received")]
    NotBorrowed,
    /// No key with that id exists in the catalog.
    #[error("key-not-found")]
    KeyNotFound,
}

/// Result of an atomic transition: either committed with its event, or
/// rejected with no writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The transition committed.
    Committed(CustodyEvent),
    /// The transition was refused and rolled back.
    Rejected(CustodyConflict),
}

/// A key in the catalog together with its custody flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    /// Catalog id.
    pub id: KeyId,
    /// Display name.
    pub name: String,
    /// Site address.
    pub address: String,
    /// True while an open loan exists.
    pub borrowed: bool,
}

impl KeyRecord {
    /// A newly catalogued key, initially available.
    pub fn available(id: KeyId, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            address: address.into(),
            borrowed: false,
        }
    }
}

/// One entry of the append-only loan ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanRecord {
    /// Ledger row id.
    pub id: i64,
    /// Key reference; the key may later be removed from the catalog.
    pub key_id: KeyId,
    /// Key name at loan time.
    pub key_name: String,
    /// Borrower full name at loan time.
    pub borrower: String,
    /// When the loan was opened.
    pub borrowed_at: DateTime<Utc>,
    /// When the key came back; `None` while the loan is open.
    pub returned_at: Option<DateTime<Utc>>,
    /// Why the key was taken.
    pub reason: String,
    /// Who accepted the key back.
    pub receiver: Option<String>,
}

impl LoanRecord {
    /// True while the key is still out.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }
}
