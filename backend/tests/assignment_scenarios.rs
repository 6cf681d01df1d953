//! End-to-end assignment scenarios driven through the domain services.

mod support;

use reviewer_backend::domain::ports::{
    OpenPullRequest, PullRequestCommand, ReviewQuery, ReviewerDeactivationCommand, StatsQuery,
    UserCommand,
};
use reviewer_backend::domain::{ErrorCode, PullRequest, PullRequestId, PullRequestStatus};
use std::collections::BTreeSet;

use rstest::{fixture, rstest};
use support::{Harness, sorted, user};

fn pr_id(id: &str) -> PullRequestId {
    PullRequestId::new(id).expect("pull request id")
}

async fn open(harness: &Harness, id: &str, author: &str) -> PullRequest {
    harness
        .engine
        .open(OpenPullRequest {
            id: pr_id(id),
            name: format!("change {id}"),
            author_id: user(author),
        })
        .await
        .expect("pull request opened")
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[rstest]
#[tokio::test]
async fn opening_picks_active_teammates_only(harness: Harness) {
    harness
        .team(
            "backend",
            &[("author", true), ("r1", true), ("r2", true), ("ghost", false)],
        )
        .await;

    let pr = open(&harness, "pr-1", "author").await;

    assert_eq!(pr.status, PullRequestStatus::Open);
    assert_eq!(sorted(&pr.assigned_reviewers), ["r1", "r2"]);
}

#[rstest]
#[tokio::test]
async fn reassignment_waits_for_an_eligible_teammate(harness: Harness) {
    harness
        .team(
            "frontend",
            &[("u1", true), ("u2", true), ("u3", true), ("u4", false)],
        )
        .await;
    let pr = open(&harness, "pr-1", "u1").await;
    assert_eq!(sorted(&pr.assigned_reviewers), ["u2", "u3"]);

    let blocked = harness
        .engine
        .reassign(&pr_id("pr-1"), &user("u2"))
        .await
        .expect_err("no candidate yet");
    harness
        .roster
        .set_is_active(&user("u4"), true)
        .await
        .expect("u4 activated");
    let swapped = harness
        .engine
        .reassign(&pr_id("pr-1"), &user("u2"))
        .await
        .expect("reassigned");

    assert_eq!(blocked.code(), ErrorCode::NoCandidate);
    assert_eq!(swapped.replaced_by, user("u4"));
    assert_eq!(sorted(&swapped.pull_request.assigned_reviewers), ["u3", "u4"]);
}

#[rstest]
#[tokio::test]
async fn cascade_replaces_both_reviewers(harness: Harness) {
    harness
        .team(
            "backend",
            &[
                ("u1", true),
                ("u2", true),
                ("u3", true),
                ("u4", false),
                ("u5", false),
            ],
        )
        .await;
    open(&harness, "pr-1", "u1").await;
    for id in ["u4", "u5"] {
        harness
            .roster
            .set_is_active(&user(id), true)
            .await
            .expect("activated");
    }

    let outcome = harness
        .engine
        .deactivate_and_reassign(&[user("u2"), user("u3")])
        .await
        .expect("cascade");
    let reviews_u4 = harness
        .engine
        .reviews_for_user(&user("u4"))
        .await
        .expect("reviews");
    let reviews_u2 = harness
        .engine
        .reviews_for_user(&user("u2"))
        .await
        .expect("reviews");

    assert_eq!(sorted(&outcome.deactivated), ["u2", "u3"]);
    let replacements = outcome.reassignments.get(&pr_id("pr-1")).expect("pr-1 entry");
    assert_eq!(sorted(replacements), ["u4", "u5"]);
    assert_eq!(reviews_u4.len(), 1);
    assert!(reviews_u2.is_empty());
}

#[rstest]
#[tokio::test]
async fn cascade_without_candidates_still_deactivates(harness: Harness) {
    harness
        .team("solo", &[("u1", true), ("u2", true), ("u3", true)])
        .await;
    open(&harness, "pr-1", "u1").await;

    let outcome = harness
        .engine
        .deactivate_and_reassign(&[user("u2")])
        .await
        .expect("cascade");
    let stats = harness.stats.stats().await.expect("stats");
    let still_reviewing = harness
        .engine
        .reviews_for_user(&user("u2"))
        .await
        .expect("reviews");

    assert_eq!(outcome.deactivated, [user("u2")]);
    assert!(outcome.reassignments.is_empty());
    assert_eq!(stats.active_users, 2);
    assert_eq!(still_reviewing.len(), 1);
}

#[rstest]
#[tokio::test]
async fn merged_pull_requests_are_frozen(harness: Harness) {
    harness
        .team("backend", &[("u1", true), ("u2", true), ("u3", true), ("u4", true)])
        .await;
    let opened = open(&harness, "pr-1", "u1").await;
    let reviewer = opened.assigned_reviewers.first().cloned().expect("reviewer");

    let merged = harness.engine.merge(&pr_id("pr-1")).await.expect("merged");
    let again = harness.engine.merge(&pr_id("pr-1")).await.expect("merged twice");
    let reassign = harness
        .engine
        .reassign(&pr_id("pr-1"), &reviewer)
        .await
        .expect_err("merged pull request");
    let cascade = harness
        .engine
        .deactivate_and_reassign(&[reviewer.clone()])
        .await
        .expect("cascade");

    assert_eq!(merged.merged_at, again.merged_at);
    assert_eq!(again.assigned_reviewers, opened.assigned_reviewers);
    assert_eq!(reassign.code(), ErrorCode::PullRequestMerged);
    assert!(cascade.reassignments.is_empty());
}

#[rstest]
#[tokio::test]
async fn reviews_list_newest_first(harness: Harness) {
    harness
        .team("backend", &[("u1", true), ("u2", true)])
        .await;
    open(&harness, "pr-a", "u1").await;
    open(&harness, "pr-b", "u1").await;

    let reviews = harness
        .engine
        .reviews_for_user(&user("u2"))
        .await
        .expect("reviews");

    let ids: Vec<&str> = reviews
        .iter()
        .map(|summary| summary.pull_request_id.as_ref())
        .collect();
    assert_eq!(ids, ["pr-b", "pr-a"]);
}

#[rstest]
#[tokio::test]
async fn opening_always_seats_distinct_active_teammates(
    #[values(1, 7, 42, 1_000)] seed: u64,
    #[values(0, 1, 2, 3, 5)] active_teammates: usize,
) {
    let harness = Harness::with_seed(seed);
    let ids: Vec<String> = (0..active_teammates).map(|n| format!("m{n}")).collect();
    let mut members: Vec<(&str, bool)> = vec![("author", true), ("idle", false)];
    members.extend(ids.iter().map(|id| (id.as_str(), true)));
    harness.team("squad", &members).await;

    let pr = open(&harness, "pr-1", "author").await;

    let seated: BTreeSet<String> = sorted(&pr.assigned_reviewers).into_iter().collect();
    assert_eq!(pr.assigned_reviewers.len(), active_teammates.min(2));
    assert_eq!(seated.len(), pr.assigned_reviewers.len());
    assert!(seated.iter().all(|id| ids.contains(id)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reassign_and_cascade_keep_seats_consistent(
    #[values(3, 11, 42, 99)] seed: u64,
) {
    let harness = Harness::with_seed(seed);
    harness
        .team(
            "backend",
            &[
                ("u1", true),
                ("u2", true),
                ("u3", true),
                ("u4", true),
                ("u5", true),
                ("u6", true),
            ],
        )
        .await;
    let opened = open(&harness, "pr-1", "u1").await;
    let (first, second) = match opened.assigned_reviewers.as_slice() {
        [first, second] => (first.clone(), second.clone()),
        other => panic!("expected two reviewers, got {other:?}"),
    };
    let pull_request = pr_id("pr-1");

    let (swap_first, swap_second, cascade) = tokio::join!(
        harness.engine.reassign(&pull_request, &first),
        harness.engine.reassign(&pull_request, &second),
        harness.engine.deactivate_and_reassign(std::slice::from_ref(&first)),
    );

    for outcome in [swap_first.err(), swap_second.err()].into_iter().flatten() {
        assert!(
            matches!(outcome.code(), ErrorCode::NotAssigned | ErrorCode::NoCandidate),
            "unexpected failure: {outcome:?}"
        );
    }
    assert_eq!(cascade.expect("cascade").deactivated, [first.clone()]);
    let settled = harness.engine.merge(&pull_request).await.expect("merged");
    let seated: BTreeSet<String> = sorted(&settled.assigned_reviewers).into_iter().collect();
    assert_eq!(settled.assigned_reviewers.len(), 2);
    assert_eq!(seated.len(), 2);
    assert!(!seated.contains("u1"));
    assert!(!seated.contains(first.as_str()));
}
