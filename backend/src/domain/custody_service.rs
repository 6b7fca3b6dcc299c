//! Key custody use-cases: borrow and receive.
//!
//! The service authorizes the actor, runs the atomic transition through the
//! repository port, and only after a commit hands the captured event to the
//! notifier. Conflicts and storage failures never reach the notifier.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::auth::Claims;
use super::authorization::{Operation, authorize};
use super::custody::{
    BorrowRequest, CustodyConflict, CustodyEvent, KeyId, LoanReason, ReceiveRequest,
    TransitionOutcome,
};
use super::error::Error;
use super::ports::{
    CustodyNotifier, KeyCustodyCommand, KeyCustodyPersistenceError, KeyCustodyRepository,
};

/// Failures of a custody transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustodyError {
    /// The key already has an open loan.
    #[error("Key is borrowed")]
    AlreadyBorrowed,
    /// The key has no open loan.
    #[error("Key is received")]
    NotBorrowed,
    /// The key id is not in the catalog.
    #[error("key-not-found")]
    KeyNotFound,
    /// Storage failed; the transition did not apply.
    #[error(transparent)]
    Persistence(#[from] KeyCustodyPersistenceError),
}

impl From<CustodyConflict> for CustodyError {
    fn from(conflict: CustodyConflict) -> Self {
        match conflict {
            CustodyConflict::AlreadyBorrowed => Self::AlreadyBorrowed,
            CustodyConflict::NotBorrowed => Self::NotBorrowed,
            CustodyConflict::KeyNotFound => Self::KeyNotFound,
        }
    }
}

impl From<CustodyError> for Error {
    fn from(error: CustodyError) -> Self {
        match error {
            CustodyError::AlreadyBorrowed | CustodyError::NotBorrowed => {
                Self::conflict(error.to_string())
            }
            CustodyError::KeyNotFound => Self::not_found(error.to_string()),
            CustodyError::Persistence(KeyCustodyPersistenceError::Connection { message }) => {
                Self::service_unavailable(format!("custody storage unavailable: {message}"))
            }
            CustodyError::Persistence(KeyCustodyPersistenceError::Query { message }) => {
                Self::internal(format!("custody storage error: {message}"))
            }
        }
    }
}

/// Custody service over a repository and a notifier.
///
/// Transition timestamps come from the repository, which reads its clock
/// under the key lock.
pub struct KeyCustodyService<R> {
    repository: Arc<R>,
    notifier: Arc<dyn CustodyNotifier>,
}

impl<R> KeyCustodyService<R>
where
    R: KeyCustodyRepository,
{
    /// Create a new service.
    pub fn new(repository: Arc<R>, notifier: Arc<dyn CustodyNotifier>) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// Open a loan for `borrower` and notify on commit.
    pub async fn borrow_key(
        &self,
        key_id: KeyId,
        reason: LoanReason,
        borrower: String,
    ) -> Result<CustodyEvent, CustodyError> {
        let request = BorrowRequest {
            key_id,
            reason,
            borrower,
        };
        let outcome = self.repository.borrow(&request).await?;
        self.finish(outcome)
    }

    /// Close the open loan, recording `receiver`, and notify on commit.
    pub async fn receive_key(
        &self,
        key_id: KeyId,
        receiver: String,
    ) -> Result<CustodyEvent, CustodyError> {
        let request = ReceiveRequest { key_id, receiver };
        let outcome = self.repository.receive(&request).await?;
        self.finish(outcome)
    }

    fn finish(&self, outcome: TransitionOutcome) -> Result<CustodyEvent, CustodyError> {
        match outcome {
            TransitionOutcome::Committed(event) => {
                info!(key_id = %event.key_id, action = ?event.action, "custody transition committed");
                self.notifier.notify(event.clone());
                Ok(event)
            }
            TransitionOutcome::Rejected(conflict) => {
                debug!(conflict = %conflict, "custody transition rejected");
                Err(conflict.into())
            }
        }
    }
}

#[async_trait]
impl<R> KeyCustodyCommand for KeyCustodyService<R>
where
    R: KeyCustodyRepository,
{
    async fn borrow(
        &self,
        actor: &Claims,
        key_id: KeyId,
        reason: LoanReason,
    ) -> Result<CustodyEvent, Error> {
        authorize(actor, Operation::Custody).map_err(|err| Error::forbidden(err.to_string()))?;
        self.borrow_key(key_id, reason, actor.full_name())
            .await
            .map_err(Error::from)
    }

    async fn receive(&self, actor: &Claims, key_id: KeyId) -> Result<CustodyEvent, Error> {
        authorize(actor, Operation::Custody).map_err(|err| Error::forbidden(err.to_string()))?;
        self.receive_key(key_id, actor.full_name())
            .await
            .map_err(Error::from)
    }
}
