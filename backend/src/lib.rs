//! Pull request reviewer assignment service.
//!
//! The domain layer owns the assignment rules, inbound adapters expose them
//! over HTTP, and outbound adapters persist them in PostgreSQL or memory.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
