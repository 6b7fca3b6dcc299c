//! Driven port owning key availability and the loan ledger.
//!
//! Each transition is one atomic unit: the adapter takes its write lock on
//! the key before reading the key's state, checks the precondition, and
//! either applies every write or none. The transition timestamp is read
//! from the adapter's clock while that lock is held, so a loan never closes
//! before it opened. Conflicts come back as
//! [`TransitionOutcome::Rejected`] so the caller alone decides what to tell
//! the client.

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{
    BorrowRequest, CustodyAction, CustodyEvent, KeyId, KeyRecord, LoanRecord, ReceiveRequest,
    TransitionOutcome,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by custody adapters.
    pub enum KeyCustodyPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "custody repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "custody repository query failed: {message}",
    }
}

/// Port for the custody state machine's storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyCustodyRepository: Send + Sync {
    /// Open a loan on an available key and mark it borrowed.
    async fn borrow(
        &self,
        request: &BorrowRequest,
    ) -> Result<TransitionOutcome, KeyCustodyPersistenceError>;

    /// Close the open loan on a borrowed key and mark it available.
    async fn receive(
        &self,
        request: &ReceiveRequest,
    ) -> Result<TransitionOutcome, KeyCustodyPersistenceError>;

    /// Fetch a key and its custody flag.
    async fn find_key(&self, id: &KeyId) -> Result<Option<KeyRecord>, KeyCustodyPersistenceError>;

    /// Ledger entries for a key, oldest first.
    async fn loans_for_key(&self, id: &KeyId)
    -> Result<Vec<LoanRecord>, KeyCustodyPersistenceError>;
}

/// Fixture repository that accepts every transition without storing it.
///
/// Events are stamped with the current wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureKeyCustodyRepository;

#[async_trait]
impl KeyCustodyRepository for FixtureKeyCustodyRepository {
    async fn borrow(
        &self,
        request: &BorrowRequest,
    ) -> Result<TransitionOutcome, KeyCustodyPersistenceError> {
        Ok(TransitionOutcome::Committed(CustodyEvent {
            actor_name: request.borrower.clone(),
            key_id: request.key_id.clone(),
            key_name: request.key_id.to_string(),
            action: CustodyAction::Take,
            at: Utc::now(),
        }))
    }

    async fn receive(
        &self,
        request: &ReceiveRequest,
    ) -> Result<TransitionOutcome, KeyCustodyPersistenceError> {
        Ok(TransitionOutcome::Committed(CustodyEvent {
            actor_name: request.receiver.clone(),
            key_id: request.key_id.clone(),
            key_name: request.key_id.to_string(),
            action: CustodyAction::Return,
            at: Utc::now(),
        }))
    }

    async fn find_key(&self, _id: &KeyId) -> Result<Option<KeyRecord>, KeyCustodyPersistenceError> {
        Ok(None)
    }

    async fn loans_for_key(
        &self,
        _id: &KeyId,
    ) -> Result<Vec<LoanRecord>, KeyCustodyPersistenceError> {
        Ok(Vec::new())
    }
}
