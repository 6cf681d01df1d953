//! Reviewer assignment engine.
//!
//! Opens pull requests with an initial reviewer set, merges them, swaps single
//! reviewers, and cascades replacements when users are deactivated. Each call
//! is one atomic unit against the [`ReviewStore`]; validation failures roll the
//! unit back before anything becomes visible.

mod cascade;
mod lifecycle;
mod reassignment;


use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

pub use lifecycle::INITIAL_REVIEWERS;

use crate::domain::ports::{
    OpenPullRequest, PullRequestCommand, ReviewQuery, ReviewStore, ReviewerDeactivationCommand,
};
use crate::domain::selection::CandidateSelector;
use crate::domain::unit_of_work::{begin, finish, map_store_error, within_deadline};
use crate::domain::{
    DeactivationOutcome, Error, PullRequest, PullRequestId, PullRequestSummary, Reassignment,
    UserId,
};

/// Assignment engine implementing the pull request driving ports.
pub struct ReviewAssignmentService<S: ?Sized> {
    store: Arc<S>,
    selector: Arc<dyn CandidateSelector>,
    clock: Arc<dyn Clock>,
    deadline: Option<Duration>,
}

impl<S: ?Sized> ReviewAssignmentService<S> {
    /// Create a service over `store` with no per-operation deadline.
    ///
    /// ```
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// use reviewer_backend::domain::{RandomCandidateSelector, ReviewAssignmentService};
    /// use reviewer_backend::outbound::memory::InMemoryReviewStore;
    ///
    /// let service = ReviewAssignmentService::new(
    ///     Arc::new(InMemoryReviewStore::default()),
    ///     Arc::new(RandomCandidateSelector::from_entropy()),
    ///     Arc::new(DefaultClock),
    /// );
    /// # drop(service);
    /// ```
    pub fn new(
        store: Arc<S>,
        selector: Arc<dyn CandidateSelector>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            selector,
            clock,
            deadline: None,
        }
    }

    /// Abort any operation that runs longer than `deadline`.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

#[async_trait]
impl<S> PullRequestCommand for ReviewAssignmentService<S>
where
    S: ReviewStore + ?Sized,
{
    async fn open(&self, request: OpenPullRequest) -> Result<PullRequest, Error> {
        let now = self.clock.utc();
        let pull_request = within_deadline(self.deadline, async {
            let mut tx = begin(self.store.as_ref()).await?;
            let outcome =
                lifecycle::open_pull_request(tx.as_mut(), self.selector.as_ref(), now, request)
                    .await;
            finish(tx, outcome).await
        })
        .await?;
        info!(
            pull_request_id = %pull_request.pull_request_id,
            reviewers = pull_request.assigned_reviewers.len(),
            "pull request opened"
        );
        Ok(pull_request)
    }

    async fn merge(&self, pull_request_id: &PullRequestId) -> Result<PullRequest, Error> {
        let now = self.clock.utc();
        within_deadline(self.deadline, async {
            let mut tx = begin(self.store.as_ref()).await?;
            let outcome = lifecycle::merge_pull_request(tx.as_mut(), now, pull_request_id).await;
            finish(tx, outcome).await
        })
        .await
    }

    async fn reassign(
        &self,
        pull_request_id: &PullRequestId,
        old_reviewer_id: &UserId,
    ) -> Result<Reassignment, Error> {
        let reassignment = within_deadline(self.deadline, async {
            let mut tx = begin(self.store.as_ref()).await?;
            let outcome = reassignment::reassign_reviewer(
                tx.as_mut(),
                self.selector.as_ref(),
                pull_request_id,
                old_reviewer_id,
            )
            .await;
            finish(tx, outcome).await
        })
        .await?;
        info!(
            %pull_request_id,
            %old_reviewer_id,
            replaced_by = %reassignment.replaced_by,
            "reviewer reassigned"
        );
        Ok(reassignment)
    }
}

#[async_trait]
impl<S> ReviewerDeactivationCommand for ReviewAssignmentService<S>
where
    S: ReviewStore + ?Sized,
{
    async fn deactivate_and_reassign(
        &self,
        user_ids: &[UserId],
    ) -> Result<DeactivationOutcome, Error> {
        let outcome = within_deadline(self.deadline, async {
            let mut tx = begin(self.store.as_ref()).await?;
            let outcome =
                cascade::deactivate_and_reassign(tx.as_mut(), self.selector.as_ref(), user_ids)
                    .await;
            finish(tx, outcome).await
        })
        .await?;
        info!(
            requested = user_ids.len(),
            deactivated = outcome.deactivated.len(),
            pull_requests = outcome.reassignments.len(),
            "users deactivated"
        );
        Ok(outcome)
    }
}

#[async_trait]
impl<S> ReviewQuery for ReviewAssignmentService<S>
where
    S: ReviewStore + ?Sized,
{
    async fn reviews_for_user(&self, user_id: &UserId) -> Result<Vec<PullRequestSummary>, Error> {
        within_deadline(self.deadline, async {
            let mut tx = begin(self.store.as_ref()).await?;
            let outcome = tx.reviews_for_user(user_id).await.map_err(map_store_error);
            finish(tx, outcome).await
        })
        .await
    }
}
