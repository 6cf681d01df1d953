//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test::{self as actix_test, TestRequest};
use actix_web::{App, web};
use mockable::DefaultClock;
use serde_json::Value;

use crate::Trace;
use crate::domain::{RandomCandidateSelector, Team, TeamMember, TeamName, UserId};
use crate::inbound::http::configure;
use crate::inbound::http::health::HealthState;
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::InMemoryReviewStore;

/// Seed for the reviewer selector used by handler tests.
pub const TEST_SEED: u64 = 7;

fn member(id: &str, username: &str, is_active: bool) -> TeamMember {
    TeamMember {
        user_id: UserId::new(id).expect("valid user id"),
        username: username.to_owned(),
        is_active,
    }
}

/// State over an in-memory store holding team `backend`: u1 Alice, u2 Bob,
/// u3 Carol (all active) and u4 Dan (inactive).
pub async fn seeded_state() -> HttpState {
    let state = HttpState::from_store(
        Arc::new(InMemoryReviewStore::new()),
        Arc::new(RandomCandidateSelector::seeded(TEST_SEED)),
        Arc::new(DefaultClock),
        None,
    );
    state
        .teams
        .create_team(Team {
            team_name: TeamName::new("backend").expect("valid team name"),
            members: vec![
                member("u1", "Alice", true),
                member("u2", "Bob", true),
                member("u3", "Carol", true),
                member("u4", "Dan", false),
            ],
        })
        .await
        .expect("seed team");
    state
}

/// App with tracing and every route registered over `state`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(web::Data::new(HealthState::new()))
        .wrap(Trace)
        .configure(configure)
}

/// Send `request` and decode the JSON body, or `Value::Null` when empty.
pub async fn call_json<S, B>(app: &S, request: TestRequest) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = actix_test::call_service(app, request.to_request()).await;
    let status = response.status();
    let bytes = actix_test::read_body(response).await;
    if bytes.is_empty() {
        return (status, Value::Null);
    }
    let body = serde_json::from_slice(&bytes).expect("JSON response body");
    (status, body)
}
