//! Batch deactivation with per-seat reviewer replacement.
//!
//! Every seat is handled independently. A seat with no eligible replacement
//! is skipped without writing anything, so it never needs to be undone; only
//! a store failure aborts the batch.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use super::reassignment::{pick_replacement, swap_reviewer};
use crate::domain::ports::ReviewTransaction;
use crate::domain::selection::CandidateSelector;
use crate::domain::unit_of_work::map_store_error;
use crate::domain::{DeactivationOutcome, Error, TeamName, UserId, roster};

pub(super) async fn deactivate_and_reassign(
    tx: &mut dyn ReviewTransaction,
    selector: &dyn CandidateSelector,
    user_ids: &[UserId],
) -> Result<DeactivationOutcome, Error> {
    let mut outcome = DeactivationOutcome::default();
    let mut seen = BTreeSet::new();
    let requested: Vec<UserId> = user_ids
        .iter()
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect();
    if requested.is_empty() {
        return Ok(outcome);
    }

    outcome.deactivated = tx
        .deactivate_users(&requested)
        .await
        .map_err(map_store_error)?;
    if outcome.deactivated.is_empty() {
        return Ok(outcome);
    }

    let slots = tx
        .open_assignments(&outcome.deactivated)
        .await
        .map_err(map_store_error)?;
    let mut teams: HashMap<UserId, Option<TeamName>> = HashMap::new();

    for slot in slots {
        let team_name = match teams.get(&slot.reviewer_id) {
            Some(cached) => cached.clone(),
            None => {
                let resolved = roster::resolve_user_team(tx, &slot.reviewer_id)
                    .await
                    .map_err(map_store_error)?;
                teams.insert(slot.reviewer_id.clone(), resolved.clone());
                resolved
            }
        };
        let Some(team_name) = team_name else {
            debug!(reviewer_id = %slot.reviewer_id, "reviewer has no team; seat skipped");
            continue;
        };

        // Re-read so replacements made earlier in this batch are excluded too.
        let current = tx
            .reviewers(&slot.pull_request_id)
            .await
            .map_err(map_store_error)?;
        let replacement = pick_replacement(
            tx,
            selector,
            &team_name,
            &slot.author_id,
            &slot.reviewer_id,
            &current,
        )
        .await
        .map_err(map_store_error)?;

        match replacement {
            Some(new_reviewer) => {
                swap_reviewer(tx, &slot.pull_request_id, &slot.reviewer_id, &new_reviewer)
                    .await
                    .map_err(map_store_error)?;
                outcome.record(slot.pull_request_id, new_reviewer);
            }
            None => debug!(
                pull_request_id = %slot.pull_request_id,
                reviewer_id = %slot.reviewer_id,
                "no replacement candidate; seat left unchanged"
            ),
        }
    }

    Ok(outcome)
}
