//! Translation of pool and Diesel failures into review store errors.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::ReviewStoreError;

use super::pool::PoolError;

pub(super) fn map_pool_error(error: PoolError) -> ReviewStoreError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    ReviewStoreError::connection(message)
}

/// Map common Diesel failures. Unique violations are handled by
/// [`map_insert_error`] because only the caller knows which key collided.
pub(super) fn map_diesel_error(error: DieselError) -> ReviewStoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            ReviewStoreError::connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            ReviewStoreError::contention("concurrent update conflict")
        }
        DieselError::NotFound => ReviewStoreError::query("record not found"),
        DieselError::QueryBuilderError(_) => ReviewStoreError::query("database query error"),
        _ => ReviewStoreError::query("database error"),
    }
}

/// Map an insert failure, turning a unique violation into `duplicate`.
pub(super) fn map_insert_error<D>(error: DieselError, duplicate: D) -> ReviewStoreError
where
    D: FnOnce() -> ReviewStoreError,
{
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => duplicate(),
        other => map_diesel_error(other),
    }
}
