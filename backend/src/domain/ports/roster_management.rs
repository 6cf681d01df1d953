//! Driving ports for team registration, user activity, and statistics.

use async_trait::async_trait;

use crate::domain::{Error, SystemStats, Team, TeamName, User, UserId};

/// Team registration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TeamCommand: Send + Sync {
    /// Create a team and upsert its members.
    async fn create_team(&self, team: Team) -> Result<Team, Error>;
}

/// Team lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TeamQuery: Send + Sync {
    /// Fetch a team with its members.
    async fn get_team(&self, team_name: &TeamName) -> Result<Team, Error>;
}

/// User activity toggles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCommand: Send + Sync {
    /// Set the activity flag. Reviewer assignments are left untouched.
    async fn set_is_active(&self, user_id: &UserId, is_active: bool) -> Result<User, Error>;
}

/// System statistics.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsQuery: Send + Sync {
    /// Aggregate counters across teams, users, and pull requests.
    async fn stats(&self) -> Result<SystemStats, Error>;
}
