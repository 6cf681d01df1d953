//! Driving ports for the reviewer assignment engine.
//!
//! Inbound adapters call these traits; they never reach the store directly.

use async_trait::async_trait;

use crate::domain::{
    DeactivationOutcome, Error, PullRequest, PullRequestId, PullRequestSummary, Reassignment,
    UserId,
};

/// Request to open a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPullRequest {
    pub id: PullRequestId,
    pub name: String,
    pub author_id: UserId,
}

/// Lifecycle and reassignment commands on a single pull request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PullRequestCommand: Send + Sync {
    /// Open a pull request and assign up to two reviewers from the author's team.
    async fn open(&self, request: OpenPullRequest) -> Result<PullRequest, Error>;

    /// Merge a pull request. Merging twice keeps the first merge time.
    async fn merge(&self, pull_request_id: &PullRequestId) -> Result<PullRequest, Error>;

    /// Swap one reviewer for an eligible teammate.
    async fn reassign(
        &self,
        pull_request_id: &PullRequestId,
        old_reviewer_id: &UserId,
    ) -> Result<Reassignment, Error>;
}

/// Batch deactivation with best-effort reviewer replacement.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewerDeactivationCommand: Send + Sync {
    /// Deactivate `user_ids` and replace them on every open pull request.
    async fn deactivate_and_reassign(
        &self,
        user_ids: &[UserId],
    ) -> Result<DeactivationOutcome, Error>;
}

/// Read side of reviewer assignments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewQuery: Send + Sync {
    /// Pull requests the user reviews, newest first.
    async fn reviews_for_user(&self, user_id: &UserId) -> Result<Vec<PullRequestSummary>, Error>;
}
