//! Read-only system statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Number of reviewers reported in [`SystemStats::reviewer_counts`].
pub const TOP_REVIEWERS: usize = 5;

/// Assignment count for one reviewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewerLoad {
    pub username: String,
    pub assignments: u64,
}

/// Aggregate counters read from the store in one unit of work.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub total_teams: u64,
    pub total_users: u64,
    pub active_users: u64,
    pub total_pull_requests: u64,
    pub open_pull_requests: u64,
    /// Most loaded reviewers, highest count first, ties broken by username.
    pub reviewer_loads: Vec<ReviewerLoad>,
}

/// System-wide statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SystemStats {
    pub total_teams: u64,
    pub total_users: u64,
    pub active_users: u64,
    #[serde(rename = "total_prs")]
    pub total_pull_requests: u64,
    #[serde(rename = "open_prs")]
    pub open_pull_requests: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub busiest_reviewer: Option<String>,
    pub reviewer_counts: BTreeMap<String, u64>,
}

impl From<StatsSnapshot> for SystemStats {
    fn from(snapshot: StatsSnapshot) -> Self {
        let busiest_reviewer = snapshot
            .reviewer_loads
            .iter()
            .max_by(|a, b| {
                a.assignments
                    .cmp(&b.assignments)
                    .then_with(|| b.username.cmp(&a.username))
            })
            .map(|load| load.username.clone());
        let reviewer_counts = snapshot
            .reviewer_loads
            .into_iter()
            .take(TOP_REVIEWERS)
            .map(|load| (load.username, load.assignments))
            .collect();
        Self {
            total_teams: snapshot.total_teams,
            total_users: snapshot.total_users,
            active_users: snapshot.active_users,
            total_pull_requests: snapshot.total_pull_requests,
            open_pull_requests: snapshot.open_pull_requests,
            busiest_reviewer,
            reviewer_counts,
        }
    }
}
