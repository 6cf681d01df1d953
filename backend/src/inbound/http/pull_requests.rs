//! Pull request handlers.
//!
//! ```text
//! POST /pullRequest/create {"pull_request_id":"pr-1","pull_request_name":"Add search","author_id":"u1"}
//! POST /pullRequest/merge {"pull_request_id":"pr-1"}
//! POST /pullRequest/reassign {"pull_request_id":"pr-1","old_user_id":"u2"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::OpenPullRequest;
use crate::domain::{PullRequest, PullRequestId, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, require_identifier, require_text};

const PULL_REQUEST_ID: FieldName = FieldName::new("pull_request_id");
const PULL_REQUEST_NAME: FieldName = FieldName::new("pull_request_name");
const AUTHOR_ID: FieldName = FieldName::new("author_id");
const OLD_USER_ID: FieldName = FieldName::new("old_user_id");

/// Request body for `POST /pullRequest/create`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CreatePullRequestRequest {
    pub pull_request_id: Option<String>,
    pub pull_request_name: Option<String>,
    pub author_id: Option<String>,
}

/// Request body for `POST /pullRequest/merge`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct MergePullRequestRequest {
    pub pull_request_id: Option<String>,
}

/// Request body for `POST /pullRequest/reassign`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct ReassignReviewerRequest {
    pub pull_request_id: Option<String>,
    pub old_user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PullRequestEnvelope {
    pub pr: PullRequest,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ReassignResponse {
    pub pr: PullRequest,
    #[schema(value_type = String)]
    pub replaced_by: UserId,
}

/// Open a pull request and assign up to two reviewers from the author's team.
#[utoipa::path(
    post,
    path = "/pullRequest/create",
    request_body = CreatePullRequestRequest,
    responses(
        (status = 201, description = "Pull request opened", body = PullRequestEnvelope),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Unknown author", body = ErrorResponse),
        (status = 409, description = "Pull request exists", body = ErrorResponse)
    ),
    tags = ["pull_requests"],
    operation_id = "createPullRequest"
)]
#[post("/pullRequest/create")]
pub async fn create_pull_request(
    state: web::Data<HttpState>,
    payload: web::Json<CreatePullRequestRequest>,
) -> ApiResult<HttpResponse> {
    let CreatePullRequestRequest {
        pull_request_id,
        pull_request_name,
        author_id,
    } = payload.into_inner();
    let request = OpenPullRequest {
        id: require_identifier(pull_request_id, PULL_REQUEST_ID)?,
        name: require_text(pull_request_name, PULL_REQUEST_NAME)?,
        author_id: require_identifier(author_id, AUTHOR_ID)?,
    };
    let pr = state.pull_requests.open(request).await?;
    Ok(HttpResponse::Created().json(PullRequestEnvelope { pr }))
}

/// Mark a pull request merged. Repeated merges return the stored state.
#[utoipa::path(
    post,
    path = "/pullRequest/merge",
    request_body = MergePullRequestRequest,
    responses(
        (status = 200, description = "Pull request merged", body = PullRequestEnvelope),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Unknown pull request", body = ErrorResponse)
    ),
    tags = ["pull_requests"],
    operation_id = "mergePullRequest"
)]
#[post("/pullRequest/merge")]
pub async fn merge_pull_request(
    state: web::Data<HttpState>,
    payload: web::Json<MergePullRequestRequest>,
) -> ApiResult<web::Json<PullRequestEnvelope>> {
    let id: PullRequestId =
        require_identifier(payload.into_inner().pull_request_id, PULL_REQUEST_ID)?;
    let pr = state.pull_requests.merge(&id).await?;
    Ok(web::Json(PullRequestEnvelope { pr }))
}

/// Replace one reviewer with another active member of their team.
#[utoipa::path(
    post,
    path = "/pullRequest/reassign",
    request_body = ReassignReviewerRequest,
    responses(
        (status = 200, description = "Reviewer replaced", body = ReassignResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Unknown pull request or user", body = ErrorResponse),
        (status = 409, description = "Merged, not assigned, or no candidate", body = ErrorResponse)
    ),
    tags = ["pull_requests"],
    operation_id = "reassignReviewer"
)]
#[post("/pullRequest/reassign")]
pub async fn reassign_reviewer(
    state: web::Data<HttpState>,
    payload: web::Json<ReassignReviewerRequest>,
) -> ApiResult<web::Json<ReassignResponse>> {
    let ReassignReviewerRequest {
        pull_request_id,
        old_user_id,
    } = payload.into_inner();
    let id: PullRequestId = require_identifier(pull_request_id, PULL_REQUEST_ID)?;
    let old: UserId = require_identifier(old_user_id, OLD_USER_ID)?;

    let outcome = state.pull_requests.reassign(&id, &old).await?;
    Ok(web::Json(ReassignResponse {
        pr: outcome.pull_request,
        replaced_by: outcome.replaced_by,
    }))
}
