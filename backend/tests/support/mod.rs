//! Shared fixtures for integration tests over the in-memory store.

use std::sync::Arc;

use mockable::DefaultClock;
use reviewer_backend::domain::ports::TeamCommand;
use reviewer_backend::domain::{
    RandomCandidateSelector, ReviewAssignmentService, StatsService, Team, TeamMember, TeamName,
    TeamService, UserId,
};
use reviewer_backend::outbound::memory::InMemoryReviewStore;

/// Selector seed shared by every scenario.
pub const SEED: u64 = 42;

/// Roster and engine services sharing one in-memory store.
pub struct Harness {
    pub roster: TeamService<InMemoryReviewStore>,
    pub engine: ReviewAssignmentService<InMemoryReviewStore>,
    pub stats: StatsService<InMemoryReviewStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_seed(SEED)
    }

    /// Harness whose selector draws from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        let store = Arc::new(InMemoryReviewStore::new());
        Self {
            roster: TeamService::new(Arc::clone(&store)),
            stats: StatsService::new(Arc::clone(&store)),
            engine: ReviewAssignmentService::new(
                store,
                Arc::new(RandomCandidateSelector::seeded(seed)),
                Arc::new(DefaultClock),
            ),
        }
    }

    /// Register `team_name` with `(user_id, is_active)` members.
    pub async fn team(&self, team_name: &str, members: &[(&str, bool)]) {
        let team = Team {
            team_name: TeamName::new(team_name).expect("team name"),
            members: members
                .iter()
                .map(|(id, is_active)| TeamMember {
                    user_id: user(id),
                    username: format!("user {id}"),
                    is_active: *is_active,
                })
                .collect(),
        };
        self.roster.create_team(team).await.expect("team created");
    }
}

pub fn user(id: &str) -> UserId {
    UserId::new(id).expect("user id")
}

/// Sorted reviewer ids, for order-independent assertions.
pub fn sorted(ids: &[UserId]) -> Vec<String> {
    let mut out: Vec<String> = ids.iter().map(|id| id.as_ref().to_owned()).collect();
    out.sort();
    out
}
