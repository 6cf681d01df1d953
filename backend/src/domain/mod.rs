//! Domain primitives, services, and ports.
//!
//! Purpose: define the reviewer assignment rules independently of HTTP and
//! storage. Services talk to persistence only through [`ports::ReviewStore`],
//! and inbound adapters reach services only through the driving ports.
//!
//! Public surface:
//! - Error, ErrorCode: transport-agnostic failures with stable codes.
//! - Identifier newtypes and the team, user, and pull request entities.
//! - ReviewAssignmentService: open, merge, reassign, cascade deactivation.
//! - TeamService, StatsService: roster management and reporting.

pub mod error;
mod identifiers;
mod pull_request;
mod review_assignment;
mod roster;
mod selection;
mod stats;
mod stats_service;
mod team;
mod team_service;
mod trace_id;
mod unit_of_work;

pub mod ports;

pub use self::error::{Error, ErrorCode};
pub use self::identifiers::{IdentifierValidationError, PullRequestId, TeamName, UserId};
pub use self::pull_request::{
    DeactivationOutcome, PullRequest, PullRequestStatus, PullRequestSummary, Reassignment,
    UnknownStatus,
};
pub use self::review_assignment::{INITIAL_REVIEWERS, ReviewAssignmentService};
pub use self::selection::{CandidateSelector, RandomCandidateSelector};
pub use self::stats::{ReviewerLoad, StatsSnapshot, SystemStats, TOP_REVIEWERS};
pub use self::stats_service::StatsService;
pub use self::team::{Team, TeamMember, User};
pub use self::team_service::TeamService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
