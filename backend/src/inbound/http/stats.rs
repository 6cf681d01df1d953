//! Statistics handler.

use actix_web::{get, web};

use crate::domain::SystemStats;
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorResponse;
use crate::inbound::http::state::HttpState;

/// Aggregate counters and the most loaded reviewers.
#[utoipa::path(
    get,
    path = "/stats",
    responses(
        (status = 200, description = "System statistics", body = SystemStats),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    ),
    tags = ["stats"],
    operation_id = "getStats"
)]
#[get("/stats")]
pub async fn get_stats(state: web::Data<HttpState>) -> ApiResult<web::Json<SystemStats>> {
    state.stats.stats().await.map(web::Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Error;
    use crate::domain::ports::MockStatsQuery;
    use crate::inbound::http::test_utils::{call_json, seeded_state, test_app};
    use actix_web::http::{StatusCode, header};
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::json;
    use std::sync::Arc;

    #[rstest]
    #[actix_web::test]
    async fn stats_reflect_seeded_roster() {
        let app = actix_test::init_service(test_app(seeded_state().await)).await;

        let (status, body) = call_json(&app, actix_test::TestRequest::get().uri("/stats")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "total_teams": 1,
                "total_users": 4,
                "active_users": 3,
                "total_prs": 0,
                "open_prs": 0,
                "reviewer_counts": {}
            })
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn stats_name_the_busiest_reviewer() {
        let app = actix_test::init_service(test_app(seeded_state().await)).await;
        for id in ["pr-1", "pr-2"] {
            call_json(
                &app,
                actix_test::TestRequest::post()
                    .uri("/pullRequest/create")
                    .set_json(json!({
                        "pull_request_id": id,
                        "pull_request_name": "change",
                        "author_id": "u1"
                    })),
            )
            .await;
        }

        let (_, body) = call_json(&app, actix_test::TestRequest::get().uri("/stats")).await;

        assert_eq!(body["open_prs"], json!(2));
        assert_eq!(body["reviewer_counts"], json!({"Bob": 2, "Carol": 2}));
        assert_eq!(body["busiest_reviewer"], json!("Bob"));
    }

    #[rstest]
    #[actix_web::test]
    async fn unavailable_store_asks_clients_to_retry() {
        let mut stats = MockStatsQuery::new();
        stats
            .expect_stats()
            .times(1)
            .returning(|| Err(Error::service_unavailable("review store unavailable")));
        let mut state = seeded_state().await;
        state.stats = Arc::new(stats);
        let app = actix_test::init_service(test_app(state)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/stats").to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            res.headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok()),
            Some("1")
        );
    }
}
