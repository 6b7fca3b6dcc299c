//! PostgreSQL-backed `KeyCustodyRepository`.
//!
//! Every transition runs in one transaction that first locks the key row
//! with `SELECT ... FOR UPDATE`. The lock is taken before the custody flag is
//! read, so a second borrower racing on the same key blocks until the first
//! commits and then observes `borrow = true`. Transitions on other keys lock
//! other rows and proceed independently. The partial unique index on open
//! loans backs the invariant at the storage layer. Timestamps are read from
//! the clock only after the row lock is granted.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use mockable::Clock;

use crate::domain::ports::{KeyCustodyPersistenceError, KeyCustodyRepository};
use crate::domain::{
    BorrowRequest, CustodyAction, CustodyConflict, CustodyEvent, KeyId, KeyRecord, LoanRecord,
    ReceiveRequest, TransitionOutcome,
};

use super::error_mapping::{DieselFailure, classify_diesel_error, map_pool_error};
use super::models::{KeyRow, LoanRow, NewLoanRow};
use super::pool::DbPool;
use super::schema::{borrow, keys};

/// Diesel implementation of the custody repository port.
#[derive(Clone)]
pub struct DieselKeyCustodyRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselKeyCustodyRepository {
    /// Create a repository over the given pool, stamping transitions from
    /// `clock`.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

/// Why a transition transaction stopped before committing.
#[derive(Debug)]
enum TransitionAbort {
    Rejected(CustodyConflict),
    Inconsistent(String),
    Database(diesel::result::Error),
}

impl From<diesel::result::Error> for TransitionAbort {
    fn from(error: diesel::result::Error) -> Self {
        Self::Database(error)
    }
}

fn map_diesel_error(error: diesel::result::Error) -> KeyCustodyPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => KeyCustodyPersistenceError::connection(message),
        DieselFailure::UniqueViolation(message) | DieselFailure::Query(message) => {
            KeyCustodyPersistenceError::query(message)
        }
    }
}

fn settle(
    result: Result<CustodyEvent, TransitionAbort>,
) -> Result<TransitionOutcome, KeyCustodyPersistenceError> {
    match result {
        Ok(event) => Ok(TransitionOutcome::Committed(event)),
        Err(TransitionAbort::Rejected(conflict)) => Ok(TransitionOutcome::Rejected(conflict)),
        Err(TransitionAbort::Inconsistent(message)) => {
            Err(KeyCustodyPersistenceError::query(message))
        }
        Err(TransitionAbort::Database(error)) => Err(map_diesel_error(error)),
    }
}

/// Lock the key row and return `(name, borrowed)`.
async fn lock_key(
    conn: &mut diesel_async::AsyncPgConnection,
    key_id: &str,
) -> Result<(String, bool), TransitionAbort> {
    keys::table
        .find(key_id)
        .select((keys::bs_name, keys::borrow))
        .for_update()
        .get_result::<(String, bool)>(conn)
        .await
        .optional()?
        .ok_or(TransitionAbort::Rejected(CustodyConflict::KeyNotFound))
}

#[async_trait]
impl KeyCustodyRepository for DieselKeyCustodyRepository {
    async fn borrow(
        &self,
        request: &BorrowRequest,
    ) -> Result<TransitionOutcome, KeyCustodyPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, KeyCustodyPersistenceError::connection))?;
        let key_id = request.key_id.as_str();
        let clock = &self.clock;

        let result = conn
            .transaction::<CustodyEvent, TransitionAbort, _>(|conn| {
                async move {
                    let (key_name, borrowed) = lock_key(conn, key_id).await?;
                    if borrowed {
                        return Err(TransitionAbort::Rejected(CustodyConflict::AlreadyBorrowed));
                    }
                    let at = clock.utc();

                    diesel::insert_into(borrow::table)
                        .values(&NewLoanRow {
                            bs_id: key_id,
                            bs_name: &key_name,
                            fio: &request.borrower,
                            borrow_date: at,
                            prichina: request.reason.as_str(),
                        })
                        .execute(conn)
                        .await?;
                    diesel::update(keys::table.find(key_id))
                        .set(keys::borrow.eq(true))
                        .execute(conn)
                        .await?;

                    Ok(CustodyEvent {
                        actor_name: request.borrower.clone(),
                        key_id: request.key_id.clone(),
                        key_name,
                        action: CustodyAction::Take,
                        at,
                    })
                }
                .scope_boxed()
            })
            .await;
        settle(result)
    }

    async fn receive(
        &self,
        request: &ReceiveRequest,
    ) -> Result<TransitionOutcome, KeyCustodyPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, KeyCustodyPersistenceError::connection))?;
        let key_id = request.key_id.as_str();
        let clock = &self.clock;

        let result = conn
            .transaction::<CustodyEvent, TransitionAbort, _>(|conn| {
                async move {
                    let (key_name, borrowed) = lock_key(conn, key_id).await?;
                    if !borrowed {
                        return Err(TransitionAbort::Rejected(CustodyConflict::NotBorrowed));
                    }
                    let at = clock.utc();

                    let (loan_id, borrower) = borrow::table
                        .filter(borrow::bs_id.eq(key_id))
                        .filter(borrow::return_date.is_null())
                        .select((borrow::id, borrow::fio))
                        .first::<(i64, String)>(conn)
                        .await
                        .optional()?
                        .ok_or_else(|| {
                            TransitionAbort::Inconsistent(format!(
                                "key {key_id} is flagged borrowed but has no open loan"
                            ))
                        })?;

                    diesel::update(borrow::table.find(loan_id))
                        .set((
                            borrow::return_date.eq(Some(at)),
                            borrow::fio_receiver.eq(Some(request.receiver.as_str())),
                        ))
                        .execute(conn)
                        .await?;
                    diesel::update(keys::table.find(key_id))
                        .set(keys::borrow.eq(false))
                        .execute(conn)
                        .await?;

                    Ok(CustodyEvent {
                        actor_name: borrower,
                        key_id: request.key_id.clone(),
                        key_name,
                        action: CustodyAction::Return,
                        at,
                    })
                }
                .scope_boxed()
            })
            .await;
        settle(result)
    }

    async fn find_key(&self, id: &KeyId) -> Result<Option<KeyRecord>, KeyCustodyPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, KeyCustodyPersistenceError::connection))?;
        let row = keys::table
            .find(id.as_str())
            .select(KeyRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| {
            KeyRecord::try_from(row).map_err(|err| {
                KeyCustodyPersistenceError::query(format!("stored key is invalid: {err}"))
            })
        })
        .transpose()
    }

    async fn loans_for_key(
        &self,
        id: &KeyId,
    ) -> Result<Vec<LoanRecord>, KeyCustodyPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, KeyCustodyPersistenceError::connection))?;
        let rows = borrow::table
            .filter(borrow::bs_id.eq(id.as_str()))
            .order(borrow::id.asc())
            .select(LoanRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|row| {
                LoanRecord::try_from(row).map_err(|err| {
                    KeyCustodyPersistenceError::query(format!("stored loan is invalid: {err}"))
                })
            })
            .collect()
    }
}
