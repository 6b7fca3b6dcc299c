//! Shared mapping from pool and Diesel failures into port errors.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// How a Diesel failure should be reported by a port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped or could not be used.
    Connection(String),
    /// A unique constraint rejected the write.
    UniqueViolation(String),
    /// Any other query failure.
    Query(String),
}

/// Log and classify a Diesel error.
pub(crate) fn classify_diesel_error(error: DieselError) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => DieselFailure::Query("record not found".to_owned()),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            DieselFailure::Connection(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFailure::UniqueViolation(info.message().to_owned())
        }
        DieselError::DatabaseError(_, info) => DieselFailure::Query(info.message().to_owned()),
        other => DieselFailure::Query(other.to_string()),
    }
}

/// Log a pool failure and hand its message to the port's connection
/// constructor.
pub(crate) fn map_pool_error<E>(error: PoolError, connection: impl FnOnce(String) -> E) -> E {
    debug!(error = %error, "connection pool checkout failed");
    connection(error.into_message())
}
