//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every handler in the inbound HTTP layer together with
//! the domain entities and request envelopes they exchange. The document is
//! served by Swagger UI in debug builds and exported with
//! `cargo run --bin openapi-dump` for client generation.

use utoipa::OpenApi;

use crate::domain::{
    Error, ErrorCode, PullRequest, PullRequestStatus, PullRequestSummary, SystemStats, Team,
    TeamMember, User,
};
use crate::inbound::http::ErrorResponse;
use crate::inbound::http::pull_requests::{
    CreatePullRequestRequest, MergePullRequestRequest, PullRequestEnvelope,
    ReassignReviewerRequest, ReassignResponse,
};
use crate::inbound::http::teams::{
    BulkDeactivateRequest, BulkDeactivateResponse, CreateTeamRequest, TeamEnvelope,
    TeamMemberRequest,
};
use crate::inbound::http::users::{SetIsActiveRequest, UserEnvelope, UserReviewsResponse};

/// OpenAPI document for the reviewer assignment API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Reviewer assignment API",
        description = "Teams, users, and pull requests with automatic reviewer assignment."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::teams::create_team,
        crate::inbound::http::teams::get_team,
        crate::inbound::http::teams::bulk_deactivate,
        crate::inbound::http::users::set_is_active,
        crate::inbound::http::users::get_reviews,
        crate::inbound::http::pull_requests::create_pull_request,
        crate::inbound::http::pull_requests::merge_pull_request,
        crate::inbound::http::pull_requests::reassign_reviewer,
        crate::inbound::http::stats::get_stats,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Team,
        TeamMember,
        User,
        PullRequest,
        PullRequestSummary,
        PullRequestStatus,
        SystemStats,
        Error,
        ErrorCode,
        ErrorResponse,
        TeamMemberRequest,
        CreateTeamRequest,
        TeamEnvelope,
        BulkDeactivateRequest,
        BulkDeactivateResponse,
        SetIsActiveRequest,
        UserEnvelope,
        UserReviewsResponse,
        CreatePullRequestRequest,
        MergePullRequestRequest,
        ReassignReviewerRequest,
        PullRequestEnvelope,
        ReassignResponse,
    )),
    tags(
        (name = "teams", description = "Team registration and bulk deactivation"),
        (name = "users", description = "User activity and review queues"),
        (name = "pull_requests", description = "Pull request lifecycle and reviewer swaps"),
        (name = "stats", description = "Assignment statistics"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
