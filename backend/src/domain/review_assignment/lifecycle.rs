//! Opening and merging pull requests.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::ports::{NewPullRequest, OpenPullRequest, PullRequestHeader, ReviewTransaction};
use crate::domain::selection::{CandidateSelector, select_candidates};
use crate::domain::unit_of_work::map_store_error;
use crate::domain::{Error, PullRequest, PullRequestId, PullRequestStatus, roster};

/// Reviewers assigned when a pull request opens.
pub const INITIAL_REVIEWERS: usize = 2;

pub(super) async fn open_pull_request(
    tx: &mut dyn ReviewTransaction,
    selector: &dyn CandidateSelector,
    now: DateTime<Utc>,
    request: OpenPullRequest,
) -> Result<PullRequest, Error> {
    let OpenPullRequest {
        id,
        name,
        author_id,
    } = request;

    let Some(team_name) = roster::resolve_user_team(tx, &author_id)
        .await
        .map_err(map_store_error)?
    else {
        return Err(Error::not_found("resource not found")
            .with_details(json!({ "author_id": author_id.as_str() })));
    };

    tx.insert_pull_request(&NewPullRequest {
        id: id.clone(),
        name: name.clone(),
        author_id: author_id.clone(),
        created_at: now,
    })
    .await
    .map_err(map_store_error)?;

    let exclude = BTreeSet::from([author_id.clone()]);
    let reviewers = select_candidates(tx, selector, &team_name, &exclude, INITIAL_REVIEWERS)
        .await
        .map_err(map_store_error)?;
    for reviewer in &reviewers {
        tx.add_reviewer(&id, reviewer)
            .await
            .map_err(map_store_error)?;
    }

    Ok(PullRequest {
        pull_request_id: id,
        pull_request_name: name,
        author_id,
        status: PullRequestStatus::Open,
        assigned_reviewers: reviewers,
        created_at: now,
        merged_at: None,
    })
}

pub(super) async fn merge_pull_request(
    tx: &mut dyn ReviewTransaction,
    now: DateTime<Utc>,
    pull_request_id: &PullRequestId,
) -> Result<PullRequest, Error> {
    let header = tx
        .lock_pull_request(pull_request_id)
        .await
        .map_err(map_store_error)?
        .ok_or_else(|| Error::not_found("resource not found"))?;

    let header = match header.status {
        PullRequestStatus::Merged => header,
        PullRequestStatus::Open => {
            let merged_at = header.merged_at.unwrap_or(now);
            tx.mark_merged(pull_request_id, merged_at)
                .await
                .map_err(map_store_error)?;
            PullRequestHeader {
                status: PullRequestStatus::Merged,
                merged_at: Some(merged_at),
                ..header
            }
        }
    };

    let reviewers = tx
        .reviewers(pull_request_id)
        .await
        .map_err(map_store_error)?;
    Ok(header.with_reviewers(reviewers))
}
