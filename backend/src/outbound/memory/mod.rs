//! In-memory adapter for the user, custody, and recipient ports.
//!
//! Used when no database is configured and by the HTTP integration tests.
//! All state sits behind one async mutex; a transition holds the guard from
//! the state read through the last write, which gives the same
//! lock-before-read ordering as the PostgreSQL adapter. The transition
//! timestamp is taken once the guard is held.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use tokio::sync::Mutex;

use crate::domain::ports::{
    KeyCustodyPersistenceError, KeyCustodyRepository, RecipientDirectory,
    RecipientDirectoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    BorrowRequest, CustodyAction, CustodyConflict, CustodyEvent, KeyId, KeyRecord, LoanRecord,
    NewUserAccount, ReceiveRequest, Recipient, TransitionOutcome, UserAccount, UserId,
};

#[derive(Debug, Default)]
struct State {
    users: Vec<UserAccount>,
    keys: BTreeMap<KeyId, KeyRecord>,
    loans: Vec<LoanRecord>,
    recipients: Vec<Recipient>,
    last_user_id: i64,
    last_loan_id: i64,
    last_recipient_id: i64,
}

/// Shared in-memory store. Clones share the same state.
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryStore").finish_non_exhaustive()
    }
}

impl InMemoryStore {
    /// Create an empty store on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store stamping transitions from `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::default(),
            clock,
        }
    }

    /// Add or replace a catalog key.
    pub async fn insert_key(&self, key: KeyRecord) {
        let mut state = self.state.lock().await;
        state.keys.insert(key.id.clone(), key);
    }

    /// Register a notification recipient, ignoring duplicates.
    pub async fn add_recipient(&self, phone: &str) -> Recipient {
        let mut state = self.state.lock().await;
        if let Some(existing) = state.recipients.iter().find(|r| r.phone == phone) {
            return existing.clone();
        }
        state.last_recipient_id += 1;
        let recipient = Recipient {
            id: state.last_recipient_id,
            phone: phone.to_owned(),
        };
        state.recipients.push(recipient.clone());
        recipient
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_login(&self, login: &str) -> Result<Option<UserAccount>, UserPersistenceError> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|user| user.login == login).cloned())
    }

    async fn insert(&self, account: &NewUserAccount) -> Result<UserAccount, UserPersistenceError> {
        let mut state = self.state.lock().await;
        if state.users.iter().any(|user| user.login == account.login) {
            return Err(UserPersistenceError::duplicate_login(account.login.as_str()));
        }
        state.last_user_id += 1;
        let created = UserAccount::from_new(UserId::new(state.last_user_id), account.clone());
        state.users.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl KeyCustodyRepository for InMemoryStore {
    async fn borrow(
        &self,
        request: &BorrowRequest,
    ) -> Result<TransitionOutcome, KeyCustodyPersistenceError> {
        let mut state = self.state.lock().await;
        let at = self.clock.utc();
        let Some(key) = state.keys.get_mut(&request.key_id) else {
            return Ok(TransitionOutcome::Rejected(CustodyConflict::KeyNotFound));
        };
        if key.borrowed {
            return Ok(TransitionOutcome::Rejected(CustodyConflict::AlreadyBorrowed));
        }
        key.borrowed = true;
        let key_name = key.name.clone();

        state.last_loan_id += 1;
        let id = state.last_loan_id;
        state.loans.push(LoanRecord {
            id,
            key_id: request.key_id.clone(),
            key_name: key_name.clone(),
            borrower: request.borrower.clone(),
            borrowed_at: at,
            returned_at: None,
            reason: request.reason.as_str().to_owned(),
            receiver: None,
        });

        Ok(TransitionOutcome::Committed(CustodyEvent {
            actor_name: request.borrower.clone(),
            key_id: request.key_id.clone(),
            key_name,
            action: CustodyAction::Take,
            at,
        }))
    }

    async fn receive(
        &self,
        request: &ReceiveRequest,
    ) -> Result<TransitionOutcome, KeyCustodyPersistenceError> {
        let mut state = self.state.lock().await;
        let at = self.clock.utc();
        let State { keys, loans, .. } = &mut *state;
        let Some(key) = keys.get_mut(&request.key_id) else {
            return Ok(TransitionOutcome::Rejected(CustodyConflict::KeyNotFound));
        };
        if !key.borrowed {
            return Ok(TransitionOutcome::Rejected(CustodyConflict::NotBorrowed));
        }
        let Some(loan) = loans
            .iter_mut()
            .find(|loan| loan.key_id == request.key_id && loan.is_open())
        else {
            return Err(KeyCustodyPersistenceError::query(format!(
                "key {} is flagged borrowed but has no open loan",
                request.key_id
            )));
        };

        loan.returned_at = Some(at);
        loan.receiver = Some(request.receiver.clone());
        key.borrowed = false;

        Ok(TransitionOutcome::Committed(CustodyEvent {
            actor_name: loan.borrower.clone(),
            key_id: request.key_id.clone(),
            key_name: key.name.clone(),
            action: CustodyAction::Return,
            at,
        }))
    }

    async fn find_key(&self, id: &KeyId) -> Result<Option<KeyRecord>, KeyCustodyPersistenceError> {
        Ok(self.state.lock().await.keys.get(id).cloned())
    }

    async fn loans_for_key(
        &self,
        id: &KeyId,
    ) -> Result<Vec<LoanRecord>, KeyCustodyPersistenceError> {
        let state = self.state.lock().await;
        Ok(state
            .loans
            .iter()
            .filter(|loan| &loan.key_id == id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RecipientDirectory for InMemoryStore {
    async fn list_recipients(&self) -> Result<Vec<Recipient>, RecipientDirectoryError> {
        Ok(self.state.lock().await.recipients.clone())
    }
}
