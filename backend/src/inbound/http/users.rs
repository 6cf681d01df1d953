//! User handlers.
//!
//! ```text
//! POST /users/setIsActive {"user_id":"u2","is_active":false}
//! GET /users/getReview?user_id=u2
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{PullRequestSummary, User, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, require, require_identifier};

const USER_ID: FieldName = FieldName::new("user_id");
const IS_ACTIVE: FieldName = FieldName::new("is_active");

/// Request body for `POST /users/setIsActive`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct SetIsActiveRequest {
    pub user_id: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct UserIdQuery {
    pub user_id: Option<String>,
}

/// Response body for `GET /users/getReview`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UserReviewsResponse {
    #[schema(value_type = String)]
    pub user_id: UserId,
    pub pull_requests: Vec<PullRequestSummary>,
}

/// Toggle a user's activity flag. Existing reviewer seats are untouched.
#[utoipa::path(
    post,
    path = "/users/setIsActive",
    request_body = SetIsActiveRequest,
    responses(
        (status = 200, description = "User updated", body = UserEnvelope),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Unknown user", body = ErrorResponse)
    ),
    tags = ["users"],
    operation_id = "setIsActive"
)]
#[post("/users/setIsActive")]
pub async fn set_is_active(
    state: web::Data<HttpState>,
    payload: web::Json<SetIsActiveRequest>,
) -> ApiResult<web::Json<UserEnvelope>> {
    let SetIsActiveRequest { user_id, is_active } = payload.into_inner();
    let user_id: UserId = require_identifier(user_id, USER_ID)?;
    let is_active = require(is_active, IS_ACTIVE)?;
    let user = state.users.set_is_active(&user_id, is_active).await?;
    Ok(web::Json(UserEnvelope { user }))
}

/// Pull requests the user reviews, newest first.
#[utoipa::path(
    get,
    path = "/users/getReview",
    params(UserIdQuery),
    responses(
        (status = 200, description = "Reviews", body = UserReviewsResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    ),
    tags = ["users"],
    operation_id = "getUserReviews"
)]
#[get("/users/getReview")]
pub async fn get_reviews(
    state: web::Data<HttpState>,
    query: web::Query<UserIdQuery>,
) -> ApiResult<web::Json<UserReviewsResponse>> {
    let user_id: UserId = require_identifier(query.into_inner().user_id, USER_ID)?;
    let pull_requests = state.reviews.reviews_for_user(&user_id).await?;
    Ok(web::Json(UserReviewsResponse {
        user_id,
        pull_requests,
    }))
}
