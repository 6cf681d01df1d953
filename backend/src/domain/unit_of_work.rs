//! Shared unit-of-work plumbing for domain services.
//!
//! Every service call opens one transaction, runs its work against it, and
//! finishes it with [`finish`]: commit on success, rollback on any error.
//! When a deadline elapses the whole future is dropped, which drops the
//! transaction unfinished; store adapters discard its writes in that case.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::domain::Error;
use crate::domain::ports::{ReviewStore, ReviewStoreError, ReviewTransaction};

/// Map store failures onto domain errors.
pub(crate) fn map_store_error(error: ReviewStoreError) -> Error {
    match error {
        ReviewStoreError::Connection { message } => {
            Error::service_unavailable(format!("review store unavailable: {message}"))
        }
        ReviewStoreError::Contention { message } => {
            Error::service_unavailable(format!("review store busy: {message}"))
        }
        ReviewStoreError::DuplicateAssignment {
            pull_request_id,
            user_id,
        } => Error::service_unavailable(format!(
            "concurrent assignment of {user_id} to {pull_request_id}"
        )),
        ReviewStoreError::Query { message } => {
            Error::internal(format!("review store error: {message}"))
        }
        ReviewStoreError::DuplicatePullRequest { .. } => {
            Error::pull_request_exists("pull_request_id already exists")
        }
        ReviewStoreError::DuplicateTeam { .. } => Error::team_exists("team_name already exists"),
    }
}

/// Open a transaction on `store`.
pub(crate) async fn begin<S>(store: &S) -> Result<Box<dyn ReviewTransaction>, Error>
where
    S: ReviewStore + ?Sized,
{
    store.begin().await.map_err(map_store_error)
}

/// Commit when `outcome` is `Ok`, otherwise roll back and return the error.
pub(crate) async fn finish<T>(
    mut tx: Box<dyn ReviewTransaction>,
    outcome: Result<T, Error>,
) -> Result<T, Error> {
    match outcome {
        Ok(value) => {
            tx.commit().await.map_err(map_store_error)?;
            Ok(value)
        }
        Err(error) => {
            if let Err(rollback_error) = tx.rollback().await {
                warn!(%rollback_error, code = ?error.code(), "rollback failed");
            }
            Err(error)
        }
    }
}

/// Run `work` under an optional deadline.
pub(crate) async fn within_deadline<T, F>(deadline: Option<Duration>, work: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, work).await.unwrap_or_else(|_| {
            warn!(deadline = ?limit, "operation deadline exceeded");
            Err(Error::service_unavailable("operation deadline exceeded"))
        }),
        None => work.await,
    }
}
