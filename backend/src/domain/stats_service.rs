//! Statistics query service.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{ReviewStore, StatsQuery};
use crate::domain::unit_of_work::{begin, finish, map_store_error};
use crate::domain::{Error, SystemStats, TOP_REVIEWERS};

/// Read-only statistics over the review store.
pub struct StatsService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> StatsService<S> {
    /// Create a service over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> StatsQuery for StatsService<S>
where
    S: ReviewStore + ?Sized,
{
    async fn stats(&self) -> Result<SystemStats, Error> {
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = tx
            .stats_snapshot(TOP_REVIEWERS)
            .await
            .map_err(map_store_error);
        finish(tx, outcome).await.map(SystemStats::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockReviewStore, MockReviewTransaction, ReviewStoreError, ReviewTransaction,
    };
    use crate::domain::{ErrorCode, ReviewerLoad, StatsSnapshot};
    use mockall::predicate::eq;
    use rstest::rstest;

    fn store_with(tx: MockReviewTransaction) -> Arc<MockReviewStore> {
        let mut store = MockReviewStore::new();
        store
            .expect_begin()
            .return_once(move || Ok(Box::new(tx) as Box<dyn ReviewTransaction>));
        Arc::new(store)
    }

    #[rstest]
    #[tokio::test]
    async fn stats_request_top_reviewers() {
        let mut tx = MockReviewTransaction::new();
        tx.expect_stats_snapshot()
            .with(eq(TOP_REVIEWERS))
            .times(1)
            .return_once(|_| {
                Ok(StatsSnapshot {
                    total_teams: 1,
                    total_users: 3,
                    active_users: 2,
                    total_pull_requests: 1,
                    open_pull_requests: 1,
                    reviewer_loads: vec![ReviewerLoad {
                        username: "Bob".to_owned(),
                        assignments: 1,
                    }],
                })
            });
        tx.expect_commit().times(1).return_once(|| Ok(()));

        let stats = StatsService::new(store_with(tx))
            .stats()
            .await
            .expect("stats");

        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.busiest_reviewer.as_deref(), Some("Bob"));
    }

    #[rstest]
    #[tokio::test]
    async fn store_outage_is_retryable() {
        let mut tx = MockReviewTransaction::new();
        tx.expect_stats_snapshot()
            .return_once(|_| Err(ReviewStoreError::connection("refused")));
        tx.expect_rollback().times(1).return_once(|| Ok(()));

        let err = StatsService::new(store_with(tx))
            .stats()
            .await
            .expect_err("outage");

        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
