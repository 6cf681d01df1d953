//! Port for review assignment persistence.
//!
//! The store hands out one [`ReviewTransaction`] per atomic unit. Every read
//! and write of an engine operation goes through that transaction, and the
//! calling service either commits it or rolls it back before returning.
//! Dropping a transaction without finishing it must discard its writes.
//!
//! Locking contract for adapters backed by a shared database:
//! - [`ReviewTransaction::lock_pull_request`] and
//!   [`ReviewTransaction::open_assignments`] lock the pull request rows they
//!   return until the unit finishes.
//! - [`ReviewTransaction::active_members`] holds a share lock on the rows it
//!   reads so a concurrent deactivation waits for the unit to finish.
//! - [`ReviewTransaction::add_reviewer`] rejects duplicate pairs with
//!   [`ReviewStoreError::DuplicateAssignment`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    PullRequest, PullRequestId, PullRequestStatus, PullRequestSummary, StatsSnapshot, TeamMember,
    TeamName, User, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by review store adapters.
    pub enum ReviewStoreError {
        /// The store could not be reached or the connection dropped.
        Connection { message: String } =>
            "review store connection failed: {message}",
        /// The unit lost a race with a concurrent one and may be retried.
        Contention { message: String } =>
            "review store contention: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "review store query failed: {message}",
        /// A pull request with this id already exists.
        DuplicatePullRequest { pull_request_id: String } =>
            "pull request {pull_request_id} already exists",
        /// A team with this name already exists.
        DuplicateTeam { team_name: String } =>
            "team {team_name} already exists",
        /// The reviewer is already assigned to the pull request.
        DuplicateAssignment { pull_request_id: String, user_id: String } =>
            "user {user_id} already reviews pull request {pull_request_id}",
    }
}

/// Data needed to persist a newly opened pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    pub id: PullRequestId,
    pub name: String,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Stored pull request attributes without the reviewer set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestHeader {
    pub id: PullRequestId,
    pub name: String,
    pub author_id: UserId,
    pub status: PullRequestStatus,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequestHeader {
    /// Combine the header with its reviewer set.
    #[must_use]
    pub fn with_reviewers(self, assigned_reviewers: Vec<UserId>) -> PullRequest {
        PullRequest {
            pull_request_id: self.id,
            pull_request_name: self.name,
            author_id: self.author_id,
            status: self.status,
            assigned_reviewers,
            created_at: self.created_at,
            merged_at: self.merged_at,
        }
    }
}

/// One reviewer seat on an open pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentSlot {
    pub pull_request_id: PullRequestId,
    pub reviewer_id: UserId,
    pub author_id: UserId,
}

/// Opens atomic units of work against the review store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Begin a new atomic unit.
    async fn begin(&self) -> Result<Box<dyn ReviewTransaction>, ReviewStoreError>;
}

/// Reads and writes scoped to one atomic unit.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewTransaction: Send {
    /// Look up a user by id.
    async fn find_user(&mut self, user_id: &UserId) -> Result<Option<User>, ReviewStoreError>;

    /// Members of a team ordered by user id, or `None` when the team is unknown.
    async fn team_members(
        &mut self,
        team_name: &TeamName,
    ) -> Result<Option<Vec<TeamMember>>, ReviewStoreError>;

    /// Insert a team; fails with [`ReviewStoreError::DuplicateTeam`] on conflict.
    async fn insert_team(&mut self, team_name: &TeamName) -> Result<(), ReviewStoreError>;

    /// Insert the user or overwrite their name, team, and activity flag.
    async fn upsert_user(&mut self, user: &User) -> Result<(), ReviewStoreError>;

    /// Set a user's activity flag, returning the updated user if it exists.
    async fn set_user_active(
        &mut self,
        user_id: &UserId,
        is_active: bool,
    ) -> Result<Option<User>, ReviewStoreError>;

    /// Mark every known id inactive and return the ids that matched.
    async fn deactivate_users(
        &mut self,
        user_ids: &[UserId],
    ) -> Result<Vec<UserId>, ReviewStoreError>;

    /// Active members of a team ordered by user id.
    async fn active_members(
        &mut self,
        team_name: &TeamName,
    ) -> Result<Vec<UserId>, ReviewStoreError>;

    /// Insert a pull request with status OPEN.
    async fn insert_pull_request(
        &mut self,
        pull_request: &NewPullRequest,
    ) -> Result<(), ReviewStoreError>;

    /// Fetch a pull request, locking it for the rest of the unit.
    async fn lock_pull_request(
        &mut self,
        pull_request_id: &PullRequestId,
    ) -> Result<Option<PullRequestHeader>, ReviewStoreError>;

    /// Set status MERGED and stamp the merge time.
    async fn mark_merged(
        &mut self,
        pull_request_id: &PullRequestId,
        merged_at: DateTime<Utc>,
    ) -> Result<(), ReviewStoreError>;

    /// Reviewers of a pull request in assignment order.
    async fn reviewers(
        &mut self,
        pull_request_id: &PullRequestId,
    ) -> Result<Vec<UserId>, ReviewStoreError>;

    /// Assign a reviewer to a pull request.
    async fn add_reviewer(
        &mut self,
        pull_request_id: &PullRequestId,
        user_id: &UserId,
    ) -> Result<(), ReviewStoreError>;

    /// Remove a reviewer, returning whether the pair existed.
    async fn remove_reviewer(
        &mut self,
        pull_request_id: &PullRequestId,
        user_id: &UserId,
    ) -> Result<bool, ReviewStoreError>;

    /// Seats held by any of `reviewer_ids` on OPEN pull requests, ordered by
    /// pull request id and then assignment order. The pull requests are locked.
    async fn open_assignments(
        &mut self,
        reviewer_ids: &[UserId],
    ) -> Result<Vec<AssignmentSlot>, ReviewStoreError>;

    /// Pull requests reviewed by a user, newest first.
    async fn reviews_for_user(
        &mut self,
        user_id: &UserId,
    ) -> Result<Vec<PullRequestSummary>, ReviewStoreError>;

    /// Aggregate counters plus the `top` most loaded reviewers.
    async fn stats_snapshot(&mut self, top: usize) -> Result<StatsSnapshot, ReviewStoreError>;

    /// Publish every write made in this unit.
    async fn commit(&mut self) -> Result<(), ReviewStoreError>;

    /// Discard every write made in this unit.
    async fn rollback(&mut self) -> Result<(), ReviewStoreError>;
}
