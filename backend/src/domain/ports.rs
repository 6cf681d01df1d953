//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports ([`ReviewStore`], [`ReviewTransaction`]) describe how the
//! domain reaches persistence. Driving ports describe what inbound adapters
//! may ask of the domain. Driven port errors are strongly typed so adapters
//! map their failures into predictable variants.

mod macros;
mod review_assignment;
mod review_store;
mod roster_management;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use review_assignment::{
    MockPullRequestCommand, MockReviewQuery, MockReviewerDeactivationCommand,
};
pub use review_assignment::{
    OpenPullRequest, PullRequestCommand, ReviewQuery, ReviewerDeactivationCommand,
};
#[cfg(test)]
pub use review_store::{MockReviewStore, MockReviewTransaction};
pub use review_store::{
    AssignmentSlot, NewPullRequest, PullRequestHeader, ReviewStore, ReviewStoreError,
    ReviewTransaction,
};
#[cfg(test)]
pub use roster_management::{MockStatsQuery, MockTeamCommand, MockTeamQuery, MockUserCommand};
pub use roster_management::{StatsQuery, TeamCommand, TeamQuery, UserCommand};
