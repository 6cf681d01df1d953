//! Team roster entities.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{TeamName, UserId};

/// A registered user and their team affiliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    #[schema(value_type = String, example = "u1")]
    pub user_id: UserId,
    #[schema(example = "Alice")]
    pub username: String,
    #[schema(value_type = String, example = "backend")]
    pub team_name: TeamName,
    pub is_active: bool,
}

impl User {
    /// View this user as a member entry of their team.
    #[must_use]
    pub fn as_member(&self) -> TeamMember {
        TeamMember {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            is_active: self.is_active,
        }
    }
}

/// A member entry inside a [`Team`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TeamMember {
    #[schema(value_type = String, example = "u1")]
    pub user_id: UserId,
    #[schema(example = "Alice")]
    pub username: String,
    pub is_active: bool,
}

impl TeamMember {
    /// Attach the member to a team, producing the full user record.
    #[must_use]
    pub fn into_user(self, team_name: TeamName) -> User {
        User {
            user_id: self.user_id,
            username: self.username,
            team_name,
            is_active: self.is_active,
        }
    }
}

/// A team and its members, ordered by user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Team {
    #[schema(value_type = String, example = "backend")]
    pub team_name: TeamName,
    pub members: Vec<TeamMember>,
}
