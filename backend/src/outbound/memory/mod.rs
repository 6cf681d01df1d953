//! In-memory review store.
//!
//! Each transaction takes the store lock for its whole lifetime and works on
//! a private copy of the state. Commit swaps the copy in; rollback or drop
//! throws it away. Units are therefore fully serialised, which makes the
//! adapter a faithful stand-in for the database in tests and local runs.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::ports::{
    AssignmentSlot, NewPullRequest, PullRequestHeader, ReviewStore, ReviewStoreError,
    ReviewTransaction,
};
use crate::domain::{
    PullRequestId, PullRequestStatus, PullRequestSummary, ReviewerLoad, StatsSnapshot, TeamMember,
    TeamName, User, UserId,
};

#[derive(Debug, Clone)]
struct StoredPullRequest {
    header: PullRequestHeader,
    reviewers: Vec<UserId>,
}

#[derive(Debug, Clone, Default)]
struct ReviewState {
    teams: BTreeSet<TeamName>,
    users: BTreeMap<UserId, User>,
    pull_requests: BTreeMap<PullRequestId, StoredPullRequest>,
}

/// Review store keeping all state in process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReviewStore {
    state: Arc<Mutex<ReviewState>>,
}

impl InMemoryReviewStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn begin(&self) -> Result<Box<dyn ReviewTransaction>, ReviewStoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryReviewTransaction {
            guard: Some(guard),
            working,
        }))
    }
}

struct InMemoryReviewTransaction {
    guard: Option<OwnedMutexGuard<ReviewState>>,
    working: ReviewState,
}

impl InMemoryReviewTransaction {
    fn ensure_open(&self) -> Result<(), ReviewStoreError> {
        if self.guard.is_some() {
            Ok(())
        } else {
            Err(ReviewStoreError::query("transaction already finished"))
        }
    }

    fn pull_request_mut(
        &mut self,
        pull_request_id: &PullRequestId,
    ) -> Result<&mut StoredPullRequest, ReviewStoreError> {
        self.working
            .pull_requests
            .get_mut(pull_request_id)
            .ok_or_else(|| {
                ReviewStoreError::query(format!("pull request {pull_request_id} does not exist"))
            })
    }

    fn require_user(&self, user_id: &UserId) -> Result<(), ReviewStoreError> {
        if self.working.users.contains_key(user_id) {
            Ok(())
        } else {
            Err(ReviewStoreError::query(format!(
                "user {user_id} does not exist"
            )))
        }
    }
}

#[async_trait]
impl ReviewTransaction for InMemoryReviewTransaction {
    async fn find_user(&mut self, user_id: &UserId) -> Result<Option<User>, ReviewStoreError> {
        self.ensure_open()?;
        Ok(self.working.users.get(user_id).cloned())
    }

    async fn team_members(
        &mut self,
        team_name: &TeamName,
    ) -> Result<Option<Vec<TeamMember>>, ReviewStoreError> {
        self.ensure_open()?;
        if !self.working.teams.contains(team_name) {
            return Ok(None);
        }
        Ok(Some(
            self.working
                .users
                .values()
                .filter(|user| &user.team_name == team_name)
                .map(User::as_member)
                .collect(),
        ))
    }

    async fn insert_team(&mut self, team_name: &TeamName) -> Result<(), ReviewStoreError> {
        self.ensure_open()?;
        if !self.working.teams.insert(team_name.clone()) {
            return Err(ReviewStoreError::duplicate_team(team_name.as_str()));
        }
        Ok(())
    }

    async fn upsert_user(&mut self, user: &User) -> Result<(), ReviewStoreError> {
        self.ensure_open()?;
        if !self.working.teams.contains(&user.team_name) {
            return Err(ReviewStoreError::query(format!(
                "team {} does not exist",
                user.team_name
            )));
        }
        self.working.users.insert(user.user_id.clone(), user.clone());
        Ok(())
    }

    async fn set_user_active(
        &mut self,
        user_id: &UserId,
        is_active: bool,
    ) -> Result<Option<User>, ReviewStoreError> {
        self.ensure_open()?;
        Ok(self.working.users.get_mut(user_id).map(|user| {
            user.is_active = is_active;
            user.clone()
        }))
    }

    async fn deactivate_users(
        &mut self,
        user_ids: &[UserId],
    ) -> Result<Vec<UserId>, ReviewStoreError> {
        self.ensure_open()?;
        let mut matched = Vec::new();
        for user_id in user_ids {
            if let Some(user) = self.working.users.get_mut(user_id) {
                user.is_active = false;
                matched.push(user_id.clone());
            }
        }
        Ok(matched)
    }

    async fn active_members(
        &mut self,
        team_name: &TeamName,
    ) -> Result<Vec<UserId>, ReviewStoreError> {
        self.ensure_open()?;
        Ok(self
            .working
            .users
            .values()
            .filter(|user| user.is_active && &user.team_name == team_name)
            .map(|user| user.user_id.clone())
            .collect())
    }

    async fn insert_pull_request(
        &mut self,
        pull_request: &NewPullRequest,
    ) -> Result<(), ReviewStoreError> {
        self.ensure_open()?;
        if self.working.pull_requests.contains_key(&pull_request.id) {
            return Err(ReviewStoreError::duplicate_pull_request(
                pull_request.id.as_str(),
            ));
        }
        self.require_user(&pull_request.author_id)?;
        self.working.pull_requests.insert(
            pull_request.id.clone(),
            StoredPullRequest {
                header: PullRequestHeader {
                    id: pull_request.id.clone(),
                    name: pull_request.name.clone(),
                    author_id: pull_request.author_id.clone(),
                    status: PullRequestStatus::Open,
                    created_at: pull_request.created_at,
                    merged_at: None,
                },
                reviewers: Vec::new(),
            },
        );
        Ok(())
    }

    async fn lock_pull_request(
        &mut self,
        pull_request_id: &PullRequestId,
    ) -> Result<Option<PullRequestHeader>, ReviewStoreError> {
        self.ensure_open()?;
        Ok(self
            .working
            .pull_requests
            .get(pull_request_id)
            .map(|stored| stored.header.clone()))
    }

    async fn mark_merged(
        &mut self,
        pull_request_id: &PullRequestId,
        merged_at: DateTime<Utc>,
    ) -> Result<(), ReviewStoreError> {
        self.ensure_open()?;
        let stored = self.pull_request_mut(pull_request_id)?;
        stored.header.status = PullRequestStatus::Merged;
        stored.header.merged_at = Some(merged_at);
        Ok(())
    }

    async fn reviewers(
        &mut self,
        pull_request_id: &PullRequestId,
    ) -> Result<Vec<UserId>, ReviewStoreError> {
        self.ensure_open()?;
        Ok(self
            .working
            .pull_requests
            .get(pull_request_id)
            .map(|stored| stored.reviewers.clone())
            .unwrap_or_default())
    }

    async fn add_reviewer(
        &mut self,
        pull_request_id: &PullRequestId,
        user_id: &UserId,
    ) -> Result<(), ReviewStoreError> {
        self.ensure_open()?;
        self.require_user(user_id)?;
        let stored = self.pull_request_mut(pull_request_id)?;
        if stored.reviewers.contains(user_id) {
            return Err(ReviewStoreError::duplicate_assignment(
                pull_request_id.as_str(),
                user_id.as_str(),
            ));
        }
        stored.reviewers.push(user_id.clone());
        Ok(())
    }

    async fn remove_reviewer(
        &mut self,
        pull_request_id: &PullRequestId,
        user_id: &UserId,
    ) -> Result<bool, ReviewStoreError> {
        self.ensure_open()?;
        let Some(stored) = self.working.pull_requests.get_mut(pull_request_id) else {
            return Ok(false);
        };
        let before = stored.reviewers.len();
        stored.reviewers.retain(|id| id != user_id);
        Ok(stored.reviewers.len() != before)
    }

    async fn open_assignments(
        &mut self,
        reviewer_ids: &[UserId],
    ) -> Result<Vec<AssignmentSlot>, ReviewStoreError> {
        self.ensure_open()?;
        let wanted: BTreeSet<&UserId> = reviewer_ids.iter().collect();
        Ok(self
            .working
            .pull_requests
            .values()
            .filter(|stored| stored.header.status == PullRequestStatus::Open)
            .flat_map(|stored| {
                stored
                    .reviewers
                    .iter()
                    .filter(|reviewer| wanted.contains(reviewer))
                    .map(|reviewer| AssignmentSlot {
                        pull_request_id: stored.header.id.clone(),
                        reviewer_id: reviewer.clone(),
                        author_id: stored.header.author_id.clone(),
                    })
            })
            .collect())
    }

    async fn reviews_for_user(
        &mut self,
        user_id: &UserId,
    ) -> Result<Vec<PullRequestSummary>, ReviewStoreError> {
        self.ensure_open()?;
        let mut reviewed: Vec<&StoredPullRequest> = self
            .working
            .pull_requests
            .values()
            .filter(|stored| stored.reviewers.contains(user_id))
            .collect();
        reviewed.sort_by(|a, b| {
            b.header
                .created_at
                .cmp(&a.header.created_at)
                .then_with(|| b.header.id.cmp(&a.header.id))
        });
        Ok(reviewed
            .into_iter()
            .map(|stored| PullRequestSummary {
                pull_request_id: stored.header.id.clone(),
                pull_request_name: stored.header.name.clone(),
                author_id: stored.header.author_id.clone(),
                status: stored.header.status,
            })
            .collect())
    }

    async fn stats_snapshot(&mut self, top: usize) -> Result<StatsSnapshot, ReviewStoreError> {
        self.ensure_open()?;
        let state = &self.working;
        // Loads are keyed by username; users sharing one are summed.
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for stored in state.pull_requests.values() {
            for reviewer in &stored.reviewers {
                if let Some(user) = state.users.get(reviewer) {
                    *counts.entry(user.username.as_str()).or_default() += 1;
                }
            }
        }
        let mut reviewer_loads: Vec<ReviewerLoad> = counts
            .into_iter()
            .map(|(username, assignments)| ReviewerLoad {
                username: username.to_owned(),
                assignments,
            })
            .collect();
        reviewer_loads.sort_by(|a, b| {
            b.assignments
                .cmp(&a.assignments)
                .then_with(|| a.username.cmp(&b.username))
        });
        reviewer_loads.truncate(top);

        let count = |n: usize| u64::try_from(n).unwrap_or(u64::MAX);
        Ok(StatsSnapshot {
            total_teams: count(state.teams.len()),
            total_users: count(state.users.len()),
            active_users: count(state.users.values().filter(|u| u.is_active).count()),
            total_pull_requests: count(state.pull_requests.len()),
            open_pull_requests: count(
                state
                    .pull_requests
                    .values()
                    .filter(|stored| stored.header.status == PullRequestStatus::Open)
                    .count(),
            ),
            reviewer_loads,
        })
    }

    async fn commit(&mut self) -> Result<(), ReviewStoreError> {
        let Some(mut guard) = self.guard.take() else {
            return Err(ReviewStoreError::query("transaction already finished"));
        };
        *guard = std::mem::take(&mut self.working);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), ReviewStoreError> {
        self.guard.take();
        Ok(())
    }
}
