//! Team registration and user activity service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{ReviewStore, TeamCommand, TeamQuery, UserCommand};
use crate::domain::unit_of_work::{begin, finish, map_store_error};
use crate::domain::{Error, Team, TeamName, User, UserId};

/// Roster management implementing the team and user driving ports.
pub struct TeamService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> TeamService<S> {
    /// Create a service over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> TeamCommand for TeamService<S>
where
    S: ReviewStore + ?Sized,
{
    async fn create_team(&self, team: Team) -> Result<Team, Error> {
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = async {
            tx.insert_team(&team.team_name)
                .await
                .map_err(map_store_error)?;
            for member in &team.members {
                let user = member.clone().into_user(team.team_name.clone());
                tx.upsert_user(&user).await.map_err(map_store_error)?;
            }
            tx.team_members(&team.team_name)
                .await
                .map_err(map_store_error)?
                .ok_or_else(|| Error::internal("team vanished during creation"))
        }
        .await;
        let members = finish(tx, outcome).await?;
        info!(team_name = %team.team_name, members = members.len(), "team created");
        Ok(Team {
            team_name: team.team_name,
            members,
        })
    }
}

#[async_trait]
impl<S> TeamQuery for TeamService<S>
where
    S: ReviewStore + ?Sized,
{
    async fn get_team(&self, team_name: &TeamName) -> Result<Team, Error> {
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = async {
            tx.team_members(team_name)
                .await
                .map_err(map_store_error)?
                .ok_or_else(|| Error::not_found("resource not found"))
        }
        .await;
        let members = finish(tx, outcome).await?;
        Ok(Team {
            team_name: team_name.clone(),
            members,
        })
    }
}

#[async_trait]
impl<S> UserCommand for TeamService<S>
where
    S: ReviewStore + ?Sized,
{
    async fn set_is_active(&self, user_id: &UserId, is_active: bool) -> Result<User, Error> {
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = async {
            tx.set_user_active(user_id, is_active)
                .await
                .map_err(map_store_error)?
                .ok_or_else(|| Error::not_found("resource not found"))
        }
        .await;
        let user = finish(tx, outcome).await?;
        info!(%user_id, is_active, "user activity updated");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockReviewStore, MockReviewTransaction, ReviewStoreError, ReviewTransaction,
    };
    use crate::domain::{ErrorCode, TeamMember};
    use rstest::{fixture, rstest};

    fn store_with(tx: MockReviewTransaction) -> Arc<MockReviewStore> {
        let mut store = MockReviewStore::new();
        store
            .expect_begin()
            .times(1)
            .return_once(move || Ok(Box::new(tx) as Box<dyn ReviewTransaction>));
        Arc::new(store)
    }

    fn member(id: &str, is_active: bool) -> TeamMember {
        TeamMember {
            user_id: UserId::new(id).expect("valid id"),
            username: id.to_uppercase(),
            is_active,
        }
    }

    #[fixture]
    fn backend_team() -> Team {
        Team {
            team_name: TeamName::new("backend").expect("valid team"),
            members: vec![member("u1", true), member("u2", false)],
        }
    }

    #[rstest]
    #[tokio::test]
    async fn create_team_upserts_every_member(backend_team: Team) {
        let expected = backend_team.members.clone();
        let mut tx = MockReviewTransaction::new();
        tx.expect_insert_team().times(1).return_once(|_| Ok(()));
        tx.expect_upsert_user()
            .withf(|user| user.team_name.as_str() == "backend")
            .times(2)
            .returning(|_| Ok(()));
        tx.expect_team_members()
            .times(1)
            .return_once(move |_| Ok(Some(expected)));
        tx.expect_commit().times(1).return_once(|| Ok(()));

        let team = TeamService::new(store_with(tx))
            .create_team(backend_team.clone())
            .await
            .expect("team created");

        assert_eq!(team, backend_team);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_team_rolls_back(backend_team: Team) {
        let mut tx = MockReviewTransaction::new();
        tx.expect_insert_team()
            .return_once(|_| Err(ReviewStoreError::duplicate_team("backend")));
        tx.expect_upsert_user().never();
        tx.expect_commit().never();
        tx.expect_rollback().times(1).return_once(|| Ok(()));

        let err = TeamService::new(store_with(tx))
            .create_team(backend_team)
            .await
            .expect_err("duplicate");

        assert_eq!(err.code(), ErrorCode::TeamExists);
        assert_eq!(err.message(), "team_name already exists");
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_team_is_not_found() {
        let mut tx = MockReviewTransaction::new();
        tx.expect_team_members().return_once(|_| Ok(None));
        tx.expect_rollback().times(1).return_once(|| Ok(()));

        let err = TeamService::new(store_with(tx))
            .get_team(&TeamName::new("ghosts").expect("valid team"))
            .await
            .expect_err("missing");

        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn set_is_active_returns_updated_user() {
        let mut tx = MockReviewTransaction::new();
        tx.expect_set_user_active().return_once(|id, active| {
            Ok(Some(User {
                user_id: id.clone(),
                username: "Bob".to_owned(),
                team_name: TeamName::new("backend").expect("valid team"),
                is_active: active,
            }))
        });
        tx.expect_commit().times(1).return_once(|| Ok(()));

        let user = TeamService::new(store_with(tx))
            .set_is_active(&UserId::new("u2").expect("valid id"), false)
            .await
            .expect("updated");

        assert!(!user.is_active);
    }
}
