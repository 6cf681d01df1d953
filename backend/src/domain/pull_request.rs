//! Pull request entities and engine results.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{PullRequestId, UserId};

/// Lifecycle state of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullRequestStatus {
    /// Reviewers may still be reassigned.
    Open,
    /// Reviewer set is frozen.
    Merged,
}

impl PullRequestStatus {
    /// Stored representation of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Merged => "MERGED",
        }
    }
}

impl fmt::Display for PullRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown status values read back from storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pull request status: {0}")]
pub struct UnknownStatus(pub String);

impl std::str::FromStr for PullRequestStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "MERGED" => Ok(Self::Merged),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// A pull request together with its current reviewer set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PullRequest {
    #[schema(value_type = String, example = "pr-1001")]
    pub pull_request_id: PullRequestId,
    #[schema(example = "Add search")]
    pub pull_request_name: String,
    #[schema(value_type = String, example = "u1")]
    pub author_id: UserId,
    pub status: PullRequestStatus,
    #[schema(value_type = Vec<String>)]
    pub assigned_reviewers: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// Whether the reviewer set may still change.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == PullRequestStatus::Open
    }

    /// Whether `user_id` currently reviews this pull request.
    #[must_use]
    pub fn has_reviewer(&self, user_id: &UserId) -> bool {
        self.assigned_reviewers.contains(user_id)
    }
}

/// Compact listing entry returned by review queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PullRequestSummary {
    #[schema(value_type = String, example = "pr-1001")]
    pub pull_request_id: PullRequestId,
    #[schema(example = "Add search")]
    pub pull_request_name: String,
    #[schema(value_type = String, example = "u1")]
    pub author_id: UserId,
    pub status: PullRequestStatus,
}

/// Result of a single reviewer swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    /// The pull request after the swap.
    pub pull_request: PullRequest,
    /// The reviewer that replaced the old one.
    pub replaced_by: UserId,
}

/// Result of a batch deactivation.
///
/// Pull requests where no replacement was found are absent from
/// `reassignments`; they never appear with an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeactivationOutcome {
    /// Requested user ids that matched a known user.
    pub deactivated: Vec<UserId>,
    /// New reviewers per pull request, in processing order.
    pub reassignments: BTreeMap<PullRequestId, Vec<UserId>>,
}

impl DeactivationOutcome {
    pub(crate) fn record(&mut self, pull_request_id: PullRequestId, reviewer: UserId) {
        self.reassignments
            .entry(pull_request_id)
            .or_default()
            .push(reviewer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PullRequestStatus::Open)]
    #[case(PullRequestStatus::Merged)]
    fn status_parses_its_stored_form(#[case] status: PullRequestStatus) {
        assert_eq!(status.as_str().parse::<PullRequestStatus>(), Ok(status));
    }

    #[rstest]
    fn unknown_status_is_rejected() {
        assert_eq!(
            "CLOSED".parse::<PullRequestStatus>(),
            Err(UnknownStatus("CLOSED".to_owned()))
        );
    }

    #[rstest]
    fn outcome_groups_reviewers_per_pull_request() {
        let pr = PullRequestId::new("pr-1").expect("valid id");
        let mut outcome = DeactivationOutcome::default();
        outcome.record(pr.clone(), UserId::new("u4").expect("valid id"));
        outcome.record(pr.clone(), UserId::new("u5").expect("valid id"));

        let reviewers = outcome.reassignments.get(&pr).expect("entry");
        let ids: Vec<&str> = reviewers.iter().map(UserId::as_str).collect();
        assert_eq!(ids, ["u4", "u5"]);
    }
}
