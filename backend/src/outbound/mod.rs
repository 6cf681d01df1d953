//! Outbound adapters implementing the review store port.
//!
//! - **memory**: process-local store for tests and database-less runs
//! - **persistence**: PostgreSQL via Diesel
//!
//! Adapters translate between domain types and storage representations and
//! hold no assignment rules.

pub mod memory;
pub mod persistence;
