//! Team handlers.
//!
//! ```text
//! POST /team/add {"team_name":"backend","members":[{"user_id":"u1","username":"Alice","is_active":true}]}
//! GET /team/get?team_name=backend
//! POST /team/bulkDeactivate {"user_ids":["u2","u3"]}
//! ```

use std::collections::BTreeMap;

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, Team, TeamMember, TeamName, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, empty_list_error, require, require_identifier, require_text,
};

const TEAM_NAME: FieldName = FieldName::new("team_name");
const MEMBERS: FieldName = FieldName::new("members");
const USER_ID: FieldName = FieldName::new("user_id");
const USERNAME: FieldName = FieldName::new("username");
const USER_IDS: FieldName = FieldName::new("user_ids");

/// Member entry of `POST /team/add`. `is_active` defaults to `true`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct TeamMemberRequest {
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub is_active: Option<bool>,
}

/// Request body for `POST /team/add`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateTeamRequest {
    pub team_name: Option<String>,
    pub members: Option<Vec<TeamMemberRequest>>,
}

impl TryFrom<CreateTeamRequest> for Team {
    type Error = Error;

    fn try_from(value: CreateTeamRequest) -> Result<Self, Self::Error> {
        let team_name: TeamName = require_identifier(value.team_name, TEAM_NAME)?;
        let members = require(value.members, MEMBERS)?;
        if members.is_empty() {
            return Err(empty_list_error(MEMBERS));
        }
        let members = members
            .into_iter()
            .map(|member| {
                Ok(TeamMember {
                    user_id: require_identifier(member.user_id, USER_ID)?,
                    username: require_text(member.username, USERNAME)?,
                    is_active: member.is_active.unwrap_or(true),
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(Team { team_name, members })
    }
}

/// Response body for `POST /team/add`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct TeamEnvelope {
    pub team: Team,
}

/// Query parameters for `GET /team/get`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct TeamNameQuery {
    pub team_name: Option<String>,
}

/// Request body for `POST /team/bulkDeactivate`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct BulkDeactivateRequest {
    pub user_ids: Option<Vec<String>>,
}

/// Response body for `POST /team/bulkDeactivate`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct BulkDeactivateResponse {
    /// Number of submitted ids that matched a known user.
    pub deactivated_count: usize,
    /// New reviewers per pull request, keyed by pull request id.
    #[schema(value_type = Object)]
    pub reassignments: BTreeMap<String, Vec<UserId>>,
}

/// Register a team and upsert its members.
#[utoipa::path(
    post,
    path = "/team/add",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = TeamEnvelope),
        (status = 400, description = "Invalid request or team exists", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    ),
    tags = ["teams"],
    operation_id = "createTeam"
)]
#[post("/team/add")]
pub async fn create_team(
    state: web::Data<HttpState>,
    payload: web::Json<CreateTeamRequest>,
) -> ApiResult<HttpResponse> {
    let team = Team::try_from(payload.into_inner())?;
    let team = state.teams.create_team(team).await?;
    Ok(HttpResponse::Created().json(TeamEnvelope { team }))
}

/// Fetch a team with its members.
#[utoipa::path(
    get,
    path = "/team/get",
    params(TeamNameQuery),
    responses(
        (status = 200, description = "Team", body = Team),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Unknown team", body = ErrorResponse)
    ),
    tags = ["teams"],
    operation_id = "getTeam"
)]
#[get("/team/get")]
pub async fn get_team(
    state: web::Data<HttpState>,
    query: web::Query<TeamNameQuery>,
) -> ApiResult<web::Json<Team>> {
    let team_name: TeamName = require_identifier(query.into_inner().team_name, TEAM_NAME)?;
    state.teams_query.get_team(&team_name).await.map(web::Json)
}

/// Deactivate users and replace them on every open pull request.
#[utoipa::path(
    post,
    path = "/team/bulkDeactivate",
    request_body = BulkDeactivateRequest,
    responses(
        (status = 200, description = "Users deactivated", body = BulkDeactivateResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    ),
    tags = ["teams"],
    operation_id = "bulkDeactivate"
)]
#[post("/team/bulkDeactivate")]
pub async fn bulk_deactivate(
    state: web::Data<HttpState>,
    payload: web::Json<BulkDeactivateRequest>,
) -> ApiResult<web::Json<BulkDeactivateResponse>> {
    // Ids that cannot name a user are ignored like unknown ones.
    let user_ids: Vec<UserId> = require(payload.into_inner().user_ids, USER_IDS)?
        .into_iter()
        .filter_map(|raw| UserId::new(raw).ok())
        .collect();

    let outcome = state.deactivation.deactivate_and_reassign(&user_ids).await?;

    Ok(web::Json(BulkDeactivateResponse {
        deactivated_count: outcome.deactivated.len(),
        reassignments: outcome
            .reassignments
            .into_iter()
            .map(|(pull_request_id, reviewers)| (pull_request_id.into(), reviewers))
            .collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{call_json, seeded_state, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[actix_web::test]
    async fn create_team_returns_created_team() {
        let app = actix_test::init_service(test_app(seeded_state().await)).await;

        let (status, body) = call_json(
            &app,
            actix_test::TestRequest::post().uri("/team/add").set_json(json!({
                "team_name": "mobile",
                "members": [
                    {"user_id": "m2", "username": "Mia", "is_active": false},
                    {"user_id": "m1", "username": "Max"}
                ]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            body,
            json!({"team": {"team_name": "mobile", "members": [
                {"user_id": "m1", "username": "Max", "is_active": true},
                {"user_id": "m2", "username": "Mia", "is_active": false}
            ]}})
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn duplicate_team_is_bad_request() {
        let app = actix_test::init_service(test_app(seeded_state().await)).await;

        let (status, body) = call_json(
            &app,
            actix_test::TestRequest::post().uri("/team/add").set_json(json!({
                "team_name": "backend",
                "members": [{"user_id": "u9", "username": "Zed"}]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.pointer("/error/code"), Some(&json!("team_exists")));
        assert_eq!(
            body.pointer("/error/message"),
            Some(&json!("team_name already exists"))
        );
    }

    #[rstest]
    #[case(json!({"members": [{"user_id": "u1", "username": "A"}]}), "team_name", "missing_field")]
    #[case(json!({"team_name": "qa"}), "members", "missing_field")]
    #[case(json!({"team_name": "qa", "members": []}), "members", "empty_list")]
    #[case(json!({"team_name": "qa", "members": [{"username": "A"}]}), "user_id", "missing_field")]
    #[case(json!({"team_name": "qa", "members": [{"user_id": "q1"}]}), "username", "missing_field")]
    #[actix_web::test]
    async fn invalid_team_bodies_name_the_field(
        #[case] payload: Value,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let app = actix_test::init_service(test_app(seeded_state().await)).await;

        let (status, body) = call_json(
            &app,
            actix_test::TestRequest::post()
                .uri("/team/add")
                .set_json(payload),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.pointer("/error/code"), Some(&json!("invalid_request")));
        assert_eq!(body.pointer("/error/details/field"), Some(&json!(field)));
        assert_eq!(body.pointer("/error/details/code"), Some(&json!(code)));
    }

    #[rstest]
    #[actix_web::test]
    async fn get_team_lists_members() {
        let app = actix_test::init_service(test_app(seeded_state().await)).await;

        let (status, body) = call_json(
            &app,
            actix_test::TestRequest::get().uri("/team/get?team_name=backend"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["team_name"], json!("backend"));
        assert_eq!(body["members"].as_array().map(Vec::len), Some(4));
    }

    #[rstest]
    #[case("/team/get?team_name=ghosts", StatusCode::NOT_FOUND)]
    #[case("/team/get", StatusCode::BAD_REQUEST)]
    #[actix_web::test]
    async fn get_team_failures(#[case] uri: &str, #[case] expected: StatusCode) {
        let app = actix_test::init_service(test_app(seeded_state().await)).await;

        let (status, _) = call_json(&app, actix_test::TestRequest::get().uri(uri)).await;

        assert_eq!(status, expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn bulk_deactivate_reports_matched_users() {
        let app = actix_test::init_service(test_app(seeded_state().await)).await;

        let (status, body) = call_json(
            &app,
            actix_test::TestRequest::post()
                .uri("/team/bulkDeactivate")
                .set_json(json!({"user_ids": ["u4", "ghost", "u4"]})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"deactivated_count": 1, "reassignments": {}}));
    }

    #[rstest]
    #[actix_web::test]
    async fn bulk_deactivate_skips_unusable_ids() {
        let app = actix_test::init_service(test_app(seeded_state().await)).await;

        let (status, body) = call_json(
            &app,
            actix_test::TestRequest::post()
                .uri("/team/bulkDeactivate")
                .set_json(json!({"user_ids": ["u2", " ", "", " u3"]})),
        )
        .await;
        let (_, team) = call_json(
            &app,
            actix_test::TestRequest::get().uri("/team/get?team_name=backend"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deactivated_count"], json!(1));
        let bob = team["members"]
            .as_array()
            .and_then(|members| members.iter().find(|m| m["user_id"] == json!("u2")))
            .expect("u2 listed");
        assert_eq!(bob["is_active"], json!(false));
    }

    #[rstest]
    #[actix_web::test]
    async fn bulk_deactivate_requires_user_ids() {
        let app = actix_test::init_service(test_app(seeded_state().await)).await;

        let (status, body) = call_json(
            &app,
            actix_test::TestRequest::post()
                .uri("/team/bulkDeactivate")
                .set_json(json!({})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.pointer("/error/details/field"), Some(&json!("user_ids")));
    }
}
