//! PostgreSQL-backed `RecipientDirectory` reading `telnumber`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::Recipient;
use crate::domain::ports::{RecipientDirectory, RecipientDirectoryError};

use super::error_mapping::{DieselFailure, classify_diesel_error, map_pool_error};
use super::models::RecipientRow;
use super::pool::DbPool;
use super::schema::telnumber;

/// Diesel implementation of the recipient directory port.
#[derive(Clone)]
pub struct DieselRecipientDirectory {
    pool: DbPool,
}

impl DieselRecipientDirectory {
    /// Create a directory over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipientDirectory for DieselRecipientDirectory {
    async fn list_recipients(&self) -> Result<Vec<Recipient>, RecipientDirectoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, RecipientDirectoryError::connection))?;
        let rows = telnumber::table
            .order(telnumber::id.asc())
            .select(RecipientRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| match classify_diesel_error(err) {
                DieselFailure::Connection(message) => RecipientDirectoryError::connection(message),
                DieselFailure::UniqueViolation(message) | DieselFailure::Query(message) => {
                    RecipientDirectoryError::query(message)
                }
            })?;
        Ok(rows.into_iter().map(Recipient::from).collect())
    }
}
