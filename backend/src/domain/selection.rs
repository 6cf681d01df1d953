//! Reviewer candidate selection.
//!
//! Eligible ids are fetched first and drawn from afterwards, so the draw does
//! not depend on any backend-specific random ordering and can be seeded in
//! tests.

use std::collections::BTreeSet;
use std::sync::Mutex;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::domain::ports::{ReviewStoreError, ReviewTransaction};
use crate::domain::{TeamName, UserId, roster};

/// Picks reviewers from a list of eligible ids.
#[cfg_attr(test, mockall::automock)]
pub trait CandidateSelector: Send + Sync {
    /// Choose up to `limit` distinct ids from `eligible`.
    fn choose(&self, eligible: &[UserId], limit: usize) -> Vec<UserId>;
}

/// Uniform random selection without replacement.
#[derive(Debug)]
pub struct RandomCandidateSelector {
    rng: Mutex<SmallRng>,
}

impl RandomCandidateSelector {
    /// Seed the generator from operating system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(SmallRng::from_entropy()),
        }
    }

    /// Deterministic generator for reproducible draws.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomCandidateSelector {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl CandidateSelector for RandomCandidateSelector {
    fn choose(&self, eligible: &[UserId], limit: usize) -> Vec<UserId> {
        // A poisoned lock only means another draw panicked; the generator is still usable.
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        eligible
            .choose_multiple(&mut *rng, limit)
            .cloned()
            .collect()
    }
}

/// Draw up to `limit` active members of `team_name` that are not in `exclude`.
///
/// Returns an empty list when nobody is eligible; callers decide whether that
/// is an error.
pub(crate) async fn select_candidates(
    tx: &mut dyn ReviewTransaction,
    selector: &dyn CandidateSelector,
    team_name: &TeamName,
    exclude: &BTreeSet<UserId>,
    limit: usize,
) -> Result<Vec<UserId>, ReviewStoreError> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    let eligible: Vec<UserId> = roster::active_members(tx, team_name)
        .await?
        .into_iter()
        .filter(|id| !exclude.contains(id))
        .collect();
    if eligible.is_empty() {
        return Ok(Vec::new());
    }
    Ok(selector.choose(&eligible, limit))
}
