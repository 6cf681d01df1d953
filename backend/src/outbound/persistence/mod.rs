//! PostgreSQL persistence adapter using Diesel ORM.
//!
//! `diesel-async` drives queries and `bb8` pools connections. Row structs
//! (`models.rs`) and table definitions (`schema.rs`) stay private to this
//! module; only the store, pool, and migration entry points are exported.
//!
//! ```ignore
//! use reviewer_backend::outbound::persistence::{DbPool, DieselReviewStore, PoolConfig};
//!
//! let pool = DbPool::connect(PoolConfig::new("postgres://localhost/reviews")).await?;
//! let store = DieselReviewStore::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_review_store;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_review_store::DieselReviewStore;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, OwnedConnection, PoolConfig, PoolError};
