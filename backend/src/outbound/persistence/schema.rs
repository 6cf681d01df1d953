//! Diesel table definitions. Must match `backend/migrations` exactly.

diesel::table! {
    /// Registered teams.
    teams (team_name) {
        team_name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Users; each belongs to exactly one team.
    users (user_id) {
        user_id -> Varchar,
        username -> Varchar,
        team_name -> Varchar,
        is_active -> Bool,
    }
}

diesel::table! {
    /// Pull requests with their lifecycle state.
    pull_requests (pull_request_id) {
        pull_request_id -> Varchar,
        pull_request_name -> Varchar,
        author_id -> Varchar,
        /// `OPEN` or `MERGED`, enforced by a check constraint.
        status -> Varchar,
        created_at -> Timestamptz,
        merged_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Reviewer seats. The composite key forbids double assignment.
    reviewers (pull_request_id, user_id) {
        pull_request_id -> Varchar,
        user_id -> Varchar,
        assigned_at -> Timestamptz,
    }
}

diesel::joinable!(users -> teams (team_name));
diesel::joinable!(reviewers -> pull_requests (pull_request_id));
diesel::joinable!(reviewers -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(teams, users, pull_requests, reviewers);
