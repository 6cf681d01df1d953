//! Single reviewer swaps.

use std::collections::BTreeSet;

use crate::domain::ports::{ReviewStoreError, ReviewTransaction};
use crate::domain::selection::{CandidateSelector, select_candidates};
use crate::domain::unit_of_work::map_store_error;
use crate::domain::{
    Error, PullRequestId, PullRequestStatus, Reassignment, TeamName, UserId, roster,
};

pub(super) async fn reassign_reviewer(
    tx: &mut dyn ReviewTransaction,
    selector: &dyn CandidateSelector,
    pull_request_id: &PullRequestId,
    old_reviewer_id: &UserId,
) -> Result<Reassignment, Error> {
    let header = tx
        .lock_pull_request(pull_request_id)
        .await
        .map_err(map_store_error)?
        .ok_or_else(|| Error::not_found("resource not found"))?;
    if header.status == PullRequestStatus::Merged {
        return Err(Error::pull_request_merged("cannot reassign on merged PR"));
    }

    let current = tx
        .reviewers(pull_request_id)
        .await
        .map_err(map_store_error)?;
    if !current.contains(old_reviewer_id) {
        return Err(Error::not_assigned("reviewer is not assigned to this PR"));
    }

    let team_name = roster::resolve_user_team(tx, old_reviewer_id)
        .await
        .map_err(map_store_error)?
        .ok_or_else(|| Error::not_found("resource not found"))?;

    let replacement = pick_replacement(
        tx,
        selector,
        &team_name,
        &header.author_id,
        old_reviewer_id,
        &current,
    )
    .await
    .map_err(map_store_error)?
    .ok_or_else(|| Error::no_candidate("no active replacement candidate in team"))?;

    swap_reviewer(tx, pull_request_id, old_reviewer_id, &replacement)
        .await
        .map_err(map_store_error)?;

    let reviewers = tx
        .reviewers(pull_request_id)
        .await
        .map_err(map_store_error)?;
    Ok(Reassignment {
        pull_request: header.with_reviewers(reviewers),
        replaced_by: replacement,
    })
}

/// Choose one active teammate who is neither the author, the outgoing
/// reviewer, nor anyone in `current`.
pub(super) async fn pick_replacement(
    tx: &mut dyn ReviewTransaction,
    selector: &dyn CandidateSelector,
    team_name: &TeamName,
    author_id: &UserId,
    old_reviewer_id: &UserId,
    current: &[UserId],
) -> Result<Option<UserId>, ReviewStoreError> {
    let mut exclude: BTreeSet<UserId> = current.iter().cloned().collect();
    exclude.insert(author_id.clone());
    exclude.insert(old_reviewer_id.clone());

    let Some(candidate) = select_candidates(tx, selector, team_name, &exclude, 1)
        .await?
        .into_iter()
        .next()
    else {
        return Ok(None);
    };

    if roster::is_team_member(tx, team_name, &candidate).await? {
        Ok(Some(candidate))
    } else {
        Ok(None)
    }
}

/// Replace `old_reviewer_id` with `new_reviewer_id` on a locked pull request.
pub(super) async fn swap_reviewer(
    tx: &mut dyn ReviewTransaction,
    pull_request_id: &PullRequestId,
    old_reviewer_id: &UserId,
    new_reviewer_id: &UserId,
) -> Result<(), ReviewStoreError> {
    if !tx.remove_reviewer(pull_request_id, old_reviewer_id).await? {
        return Err(ReviewStoreError::contention(format!(
            "reviewer {old_reviewer_id} left {pull_request_id} during reassignment"
        )));
    }
    tx.add_reviewer(pull_request_id, new_reviewer_id).await
}
