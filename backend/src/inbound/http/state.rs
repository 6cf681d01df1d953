//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and depend only on driving
//! ports, so they can be exercised against any store.

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;

use crate::domain::ports::{
    PullRequestCommand, ReviewQuery, ReviewStore, ReviewerDeactivationCommand, StatsQuery,
    TeamCommand, TeamQuery, UserCommand,
};
use crate::domain::{CandidateSelector, ReviewAssignmentService, StatsService, TeamService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub teams: Arc<dyn TeamCommand>,
    pub teams_query: Arc<dyn TeamQuery>,
    pub users: Arc<dyn UserCommand>,
    pub pull_requests: Arc<dyn PullRequestCommand>,
    pub deactivation: Arc<dyn ReviewerDeactivationCommand>,
    pub reviews: Arc<dyn ReviewQuery>,
    pub stats: Arc<dyn StatsQuery>,
}

impl HttpState {
    /// Wire every port to services sharing one review store.
    ///
    /// ```
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// use reviewer_backend::domain::RandomCandidateSelector;
    /// use reviewer_backend::inbound::http::state::HttpState;
    /// use reviewer_backend::outbound::memory::InMemoryReviewStore;
    ///
    /// let state = HttpState::from_store(
    ///     Arc::new(InMemoryReviewStore::new()),
    ///     Arc::new(RandomCandidateSelector::from_entropy()),
    ///     Arc::new(DefaultClock),
    ///     None,
    /// );
    /// let _stats = state.stats.clone();
    /// ```
    pub fn from_store(
        store: Arc<dyn ReviewStore>,
        selector: Arc<dyn CandidateSelector>,
        clock: Arc<dyn Clock>,
        deadline: Option<Duration>,
    ) -> Self {
        let engine = ReviewAssignmentService::new(Arc::clone(&store), selector, clock);
        let engine = Arc::new(match deadline {
            Some(limit) => engine.with_deadline(limit),
            None => engine,
        });
        let roster = Arc::new(TeamService::new(Arc::clone(&store)));
        Self {
            teams: roster.clone(),
            teams_query: roster.clone(),
            users: roster,
            pull_requests: engine.clone(),
            deactivation: engine.clone(),
            reviews: engine,
            stats: Arc::new(StatsService::new(store)),
        }
    }
}
