//! HTTP inbound adapter exposing the reviewer assignment API.

pub mod error;
pub mod health;
pub mod pull_requests;
pub mod state;
pub mod stats;
pub mod teams;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::web;

use crate::domain::Error;

pub use error::{ApiResult, ErrorResponse};

/// Register every API route plus JSON and query extractor error mapping.
///
/// Expects `web::Data<HttpState>` and `web::Data<HealthState>` on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("invalid request body: {err}")).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("invalid query string: {err}")).into()
    }))
    .service(teams::create_team)
    .service(teams::get_team)
    .service(teams::bulk_deactivate)
    .service(users::set_is_active)
    .service(users::get_reviews)
    .service(pull_requests::create_pull_request)
    .service(pull_requests::merge_pull_request)
    .service(pull_requests::reassign_reviewer)
    .service(stats::get_stats)
    .service(health::ready)
    .service(health::live);
}
