//! PostgreSQL-backed `ReviewStore` using Diesel.
//!
//! Each unit of work owns one pooled connection with an open transaction at
//! the server default isolation (READ COMMITTED). Row locks provide the
//! serialisation the engine relies on:
//!
//! - pull requests are read `FOR UPDATE` before any seat changes;
//! - candidate pools are read `FOR SHARE`, so a concurrent deactivation
//!   blocks until the unit that picked from the pool has finished;
//! - the reviewers primary key rejects a second seat for the same user.
//!
//! A unit dropped without commit or rollback returns its connection to the
//! pool mid-transaction; `diesel-async` reports such connections as broken and
//! the pool discards them, so the server rolls the work back.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};

use crate::domain::ports::{
    AssignmentSlot, NewPullRequest, PullRequestHeader, ReviewStore, ReviewStoreError,
    ReviewTransaction,
};
use crate::domain::{
    PullRequestId, PullRequestStatus, PullRequestSummary, ReviewerLoad, StatsSnapshot, TeamMember,
    TeamName, User, UserId,
};

use super::diesel_error_mapping::{map_diesel_error, map_insert_error, map_pool_error};
use super::models::{
    NewPullRequestRow, NewReviewerRow, NewTeamRow, NewUserRow, PullRequestRow,
    PullRequestSummaryRow, UserRow,
};
use super::pool::{DbPool, OwnedConnection};
use super::schema::{pull_requests, reviewers, teams, users};

/// Diesel-backed implementation of the `ReviewStore` port.
#[derive(Clone)]
pub struct DieselReviewStore {
    pool: DbPool,
}

impl DieselReviewStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for DieselReviewStore {
    async fn begin(&self) -> Result<Box<dyn ReviewTransaction>, ReviewStoreError> {
        let mut conn = self.pool.checkout().await.map_err(map_pool_error)?;
        AnsiTransactionManager::begin_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Box::new(DieselReviewTransaction { conn: Some(conn) }))
    }
}

struct DieselReviewTransaction {
    /// `None` once the unit has been committed or rolled back.
    conn: Option<OwnedConnection>,
}

impl DieselReviewTransaction {
    fn conn(&mut self) -> Result<&mut AsyncPgConnection, ReviewStoreError> {
        self.conn
            .as_deref_mut()
            .ok_or_else(|| ReviewStoreError::query("transaction already finished"))
    }
}

fn invalid_row(error: impl std::fmt::Display) -> ReviewStoreError {
    ReviewStoreError::query(format!("invalid stored row: {error}"))
}

fn user_id_from(raw: String) -> Result<UserId, ReviewStoreError> {
    UserId::new(raw).map_err(invalid_row)
}

fn pull_request_id_from(raw: String) -> Result<PullRequestId, ReviewStoreError> {
    PullRequestId::new(raw).map_err(invalid_row)
}

fn status_from(raw: &str) -> Result<PullRequestStatus, ReviewStoreError> {
    raw.parse().map_err(invalid_row)
}

fn user_from_row(row: UserRow) -> Result<User, ReviewStoreError> {
    Ok(User {
        user_id: user_id_from(row.user_id)?,
        username: row.username,
        team_name: TeamName::new(row.team_name).map_err(invalid_row)?,
        is_active: row.is_active,
    })
}

fn header_from_row(row: PullRequestRow) -> Result<PullRequestHeader, ReviewStoreError> {
    Ok(PullRequestHeader {
        status: status_from(&row.status)?,
        id: pull_request_id_from(row.pull_request_id)?,
        name: row.pull_request_name,
        author_id: user_id_from(row.author_id)?,
        created_at: row.created_at,
        merged_at: row.merged_at,
    })
}

fn summary_from_row(row: PullRequestSummaryRow) -> Result<PullRequestSummary, ReviewStoreError> {
    Ok(PullRequestSummary {
        status: status_from(&row.status)?,
        pull_request_id: pull_request_id_from(row.pull_request_id)?,
        pull_request_name: row.pull_request_name,
        author_id: user_id_from(row.author_id)?,
    })
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

#[async_trait]
impl ReviewTransaction for DieselReviewTransaction {
    async fn find_user(&mut self, user_id: &UserId) -> Result<Option<User>, ReviewStoreError> {
        let conn = self.conn()?;
        users::table
            .find(user_id.as_str())
            .select(UserRow::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(user_from_row)
            .transpose()
    }

    async fn team_members(
        &mut self,
        team_name: &TeamName,
    ) -> Result<Option<Vec<TeamMember>>, ReviewStoreError> {
        let conn = self.conn()?;
        let known: Option<String> = teams::table
            .find(team_name.as_str())
            .select(teams::team_name)
            .first(conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        if known.is_none() {
            return Ok(None);
        }

        let rows: Vec<UserRow> = users::table
            .filter(users::team_name.eq(team_name.as_str()))
            .order(users::user_id.asc())
            .select(UserRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|row| user_from_row(row).map(|user| user.as_member()))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    async fn insert_team(&mut self, team_name: &TeamName) -> Result<(), ReviewStoreError> {
        let conn = self.conn()?;
        diesel::insert_into(teams::table)
            .values(NewTeamRow {
                team_name: team_name.as_str(),
            })
            .execute(conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                map_insert_error(err, || ReviewStoreError::duplicate_team(team_name.as_str()))
            })
    }

    async fn upsert_user(&mut self, user: &User) -> Result<(), ReviewStoreError> {
        let conn = self.conn()?;
        let row = NewUserRow {
            user_id: user.user_id.as_str(),
            username: &user.username,
            team_name: user.team_name.as_str(),
            is_active: user.is_active,
        };
        diesel::insert_into(users::table)
            .values(&row)
            .on_conflict(users::user_id)
            .do_update()
            .set((
                users::username.eq(excluded(users::username)),
                users::team_name.eq(excluded(users::team_name)),
                users::is_active.eq(excluded(users::is_active)),
            ))
            .execute(conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn set_user_active(
        &mut self,
        user_id: &UserId,
        is_active: bool,
    ) -> Result<Option<User>, ReviewStoreError> {
        let conn = self.conn()?;
        diesel::update(users::table.find(user_id.as_str()))
            .set(users::is_active.eq(is_active))
            .returning(UserRow::as_returning())
            .get_result(conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(user_from_row)
            .transpose()
    }

    async fn deactivate_users(
        &mut self,
        user_ids: &[UserId],
    ) -> Result<Vec<UserId>, ReviewStoreError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn()?;
        let ids: Vec<&str> = user_ids.iter().map(UserId::as_str).collect();
        let updated: Vec<String> = diesel::update(users::table.filter(users::user_id.eq_any(ids)))
            .set(users::is_active.eq(false))
            .returning(users::user_id)
            .get_results(conn)
            .await
            .map_err(map_diesel_error)?;
        // Report in request order rather than the order rows were touched.
        Ok(user_ids
            .iter()
            .filter(|id| updated.iter().any(|raw| raw == id.as_str()))
            .cloned()
            .collect())
    }

    async fn active_members(
        &mut self,
        team_name: &TeamName,
    ) -> Result<Vec<UserId>, ReviewStoreError> {
        let conn = self.conn()?;
        let ids: Vec<String> = users::table
            .filter(users::team_name.eq(team_name.as_str()))
            .filter(users::is_active.eq(true))
            .order(users::user_id.asc())
            .select(users::user_id)
            .for_share()
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        ids.into_iter().map(user_id_from).collect()
    }

    async fn insert_pull_request(
        &mut self,
        pull_request: &NewPullRequest,
    ) -> Result<(), ReviewStoreError> {
        let conn = self.conn()?;
        diesel::insert_into(pull_requests::table)
            .values(NewPullRequestRow {
                pull_request_id: pull_request.id.as_str(),
                pull_request_name: &pull_request.name,
                author_id: pull_request.author_id.as_str(),
                status: PullRequestStatus::Open.as_str(),
                created_at: pull_request.created_at,
            })
            .execute(conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                map_insert_error(err, || {
                    ReviewStoreError::duplicate_pull_request(pull_request.id.as_str())
                })
            })
    }

    async fn lock_pull_request(
        &mut self,
        pull_request_id: &PullRequestId,
    ) -> Result<Option<PullRequestHeader>, ReviewStoreError> {
        let conn = self.conn()?;
        pull_requests::table
            .find(pull_request_id.as_str())
            .select(PullRequestRow::as_select())
            .for_update()
            .first(conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(header_from_row)
            .transpose()
    }

    async fn mark_merged(
        &mut self,
        pull_request_id: &PullRequestId,
        merged_at: DateTime<Utc>,
    ) -> Result<(), ReviewStoreError> {
        let conn = self.conn()?;
        let touched = diesel::update(pull_requests::table.find(pull_request_id.as_str()))
            .set((
                pull_requests::status.eq(PullRequestStatus::Merged.as_str()),
                pull_requests::merged_at.eq(Some(merged_at)),
            ))
            .execute(conn)
            .await
            .map_err(map_diesel_error)?;
        if touched == 0 {
            return Err(ReviewStoreError::query(format!(
                "pull request {pull_request_id} does not exist"
            )));
        }
        Ok(())
    }

    async fn reviewers(
        &mut self,
        pull_request_id: &PullRequestId,
    ) -> Result<Vec<UserId>, ReviewStoreError> {
        let conn = self.conn()?;
        let ids: Vec<String> = reviewers::table
            .filter(reviewers::pull_request_id.eq(pull_request_id.as_str()))
            .order((reviewers::assigned_at.asc(), reviewers::user_id.asc()))
            .select(reviewers::user_id)
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        ids.into_iter().map(user_id_from).collect()
    }

    async fn add_reviewer(
        &mut self,
        pull_request_id: &PullRequestId,
        user_id: &UserId,
    ) -> Result<(), ReviewStoreError> {
        let conn = self.conn()?;
        diesel::insert_into(reviewers::table)
            .values(NewReviewerRow {
                pull_request_id: pull_request_id.as_str(),
                user_id: user_id.as_str(),
            })
            .execute(conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                map_insert_error(err, || {
                    ReviewStoreError::duplicate_assignment(
                        pull_request_id.as_str(),
                        user_id.as_str(),
                    )
                })
            })
    }

    async fn remove_reviewer(
        &mut self,
        pull_request_id: &PullRequestId,
        user_id: &UserId,
    ) -> Result<bool, ReviewStoreError> {
        let conn = self.conn()?;
        let removed = diesel::delete(
            reviewers::table.find((pull_request_id.as_str(), user_id.as_str())),
        )
        .execute(conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn open_assignments(
        &mut self,
        reviewer_ids: &[UserId],
    ) -> Result<Vec<AssignmentSlot>, ReviewStoreError> {
        if reviewer_ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn()?;
        let ids: Vec<&str> = reviewer_ids.iter().map(UserId::as_str).collect();

        let held = reviewers::table
            .filter(reviewers::user_id.eq_any(ids.clone()))
            .select(reviewers::pull_request_id);
        let locked: Vec<(String, String)> = pull_requests::table
            .filter(pull_requests::status.eq(PullRequestStatus::Open.as_str()))
            .filter(pull_requests::pull_request_id.eq_any(held))
            .order(pull_requests::pull_request_id.asc())
            .select((pull_requests::pull_request_id, pull_requests::author_id))
            .for_update()
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        if locked.is_empty() {
            return Ok(Vec::new());
        }

        let authors: HashMap<&str, &str> = locked
            .iter()
            .map(|(pr, author)| (pr.as_str(), author.as_str()))
            .collect();
        let seats: Vec<(String, String)> = reviewers::table
            .filter(reviewers::pull_request_id.eq_any(authors.keys().copied().collect::<Vec<_>>()))
            .filter(reviewers::user_id.eq_any(ids))
            .order((
                reviewers::pull_request_id.asc(),
                reviewers::assigned_at.asc(),
                reviewers::user_id.asc(),
            ))
            .select((reviewers::pull_request_id, reviewers::user_id))
            .load(conn)
            .await
            .map_err(map_diesel_error)?;

        let mut slots = Vec::with_capacity(seats.len());
        for (pull_request_id, reviewer_id) in seats {
            let Some(author_id) = authors.get(pull_request_id.as_str()) else {
                continue;
            };
            slots.push(AssignmentSlot {
                author_id: user_id_from((*author_id).to_owned())?,
                pull_request_id: pull_request_id_from(pull_request_id)?,
                reviewer_id: user_id_from(reviewer_id)?,
            });
        }
        Ok(slots)
    }

    async fn reviews_for_user(
        &mut self,
        user_id: &UserId,
    ) -> Result<Vec<PullRequestSummary>, ReviewStoreError> {
        let conn = self.conn()?;
        let rows: Vec<PullRequestSummaryRow> = pull_requests::table
            .inner_join(reviewers::table)
            .filter(reviewers::user_id.eq(user_id.as_str()))
            .order((
                pull_requests::created_at.desc(),
                pull_requests::pull_request_id.desc(),
            ))
            .select(PullRequestSummaryRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(summary_from_row).collect()
    }

    async fn stats_snapshot(&mut self, top: usize) -> Result<StatsSnapshot, ReviewStoreError> {
        let conn = self.conn()?;
        let total_teams: i64 = teams::table
            .count()
            .get_result(conn)
            .await
            .map_err(map_diesel_error)?;
        let total_users: i64 = users::table
            .count()
            .get_result(conn)
            .await
            .map_err(map_diesel_error)?;
        let active_users: i64 = users::table
            .filter(users::is_active.eq(true))
            .count()
            .get_result(conn)
            .await
            .map_err(map_diesel_error)?;
        let total_pull_requests: i64 = pull_requests::table
            .count()
            .get_result(conn)
            .await
            .map_err(map_diesel_error)?;
        let open_pull_requests: i64 = pull_requests::table
            .filter(pull_requests::status.eq(PullRequestStatus::Open.as_str()))
            .count()
            .get_result(conn)
            .await
            .map_err(map_diesel_error)?;

        let loads: Vec<(String, i64)> = reviewers::table
            .inner_join(users::table)
            .group_by(users::username)
            .select((users::username, count_star()))
            .order_by((count_star().desc(), users::username.asc()))
            .limit(i64::try_from(top).unwrap_or(i64::MAX))
            .load(conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(StatsSnapshot {
            total_teams: to_count(total_teams),
            total_users: to_count(total_users),
            active_users: to_count(active_users),
            total_pull_requests: to_count(total_pull_requests),
            open_pull_requests: to_count(open_pull_requests),
            reviewer_loads: loads
                .into_iter()
                .map(|(username, assignments)| ReviewerLoad {
                    username,
                    assignments: to_count(assignments),
                })
                .collect(),
        })
    }

    async fn commit(&mut self) -> Result<(), ReviewStoreError> {
        let Some(mut conn) = self.conn.take() else {
            return Err(ReviewStoreError::query("transaction already finished"));
        };
        AnsiTransactionManager::commit_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn rollback(&mut self) -> Result<(), ReviewStoreError> {
        let Some(mut conn) = self.conn.take() else {
            return Ok(());
        };
        AnsiTransactionManager::rollback_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)
    }
}
