//! Read-only roster view over an open unit of work.

use crate::domain::ports::{ReviewStoreError, ReviewTransaction};
use crate::domain::{TeamName, UserId};

/// Resolve the team a user belongs to, or `None` for unknown users.
pub(crate) async fn resolve_user_team(
    tx: &mut dyn ReviewTransaction,
    user_id: &UserId,
) -> Result<Option<TeamName>, ReviewStoreError> {
    Ok(tx.find_user(user_id).await?.map(|user| user.team_name))
}

/// Whether `user_id` currently belongs to `team_name`.
pub(crate) async fn is_team_member(
    tx: &mut dyn ReviewTransaction,
    team_name: &TeamName,
    user_id: &UserId,
) -> Result<bool, ReviewStoreError> {
    Ok(resolve_user_team(tx, user_id)
        .await?
        .is_some_and(|team| &team == team_name))
}

/// Active members of a team ordered by user id.
pub(crate) async fn active_members(
    tx: &mut dyn ReviewTransaction,
    team_name: &TeamName,
) -> Result<Vec<UserId>, ReviewStoreError> {
    tx.active_members(team_name).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::domain::ports::MockReviewTransaction;
    use mockall::predicate::eq;
    use rstest::rstest;

    fn user(id: &str, team: &str) -> User {
        User {
            user_id: UserId::new(id).expect("valid id"),
            username: id.to_uppercase(),
            team_name: TeamName::new(team).expect("valid team"),
            is_active: true,
        }
    }

    #[rstest]
    #[case("backend", true)]
    #[case("frontend", false)]
    #[tokio::test]
    async fn membership_compares_resolved_team(#[case] team: &str, #[case] expected: bool) {
        let mut tx = MockReviewTransaction::new();
        tx.expect_find_user()
            .with(eq(UserId::new("u2").expect("valid id")))
            .times(1)
            .return_once(|_| Ok(Some(user("u2", "backend"))));

        let member = is_team_member(
            &mut tx,
            &TeamName::new(team).expect("valid team"),
            &UserId::new("u2").expect("valid id"),
        )
        .await
        .expect("lookup succeeds");

        assert_eq!(member, expected);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_user_has_no_team() {
        let mut tx = MockReviewTransaction::new();
        tx.expect_find_user().times(1).return_once(|_| Ok(None));

        let team = resolve_user_team(&mut tx, &UserId::new("ghost").expect("valid id"))
            .await
            .expect("lookup succeeds");

        assert!(team.is_none());
    }
}
