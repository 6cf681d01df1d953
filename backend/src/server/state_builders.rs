//! Builders for the review store and the HTTP state wired over it.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::info;

use reviewer_backend::domain::RandomCandidateSelector;
use reviewer_backend::domain::ports::ReviewStore;
use reviewer_backend::inbound::http::state::HttpState;
use reviewer_backend::outbound::memory::InMemoryReviewStore;
use reviewer_backend::outbound::persistence::{
    DbPool, DieselReviewStore, PoolConfig, run_migrations,
};

use super::ServerConfig;
use super::settings::ServerSettings;

/// Connect to PostgreSQL when a database URL is configured.
///
/// The pool is built first so start-up waits for the database, then pending
/// migrations are applied.
///
/// # Errors
///
/// Returns [`std::io::Error`] when the database stays unreachable or a
/// migration fails.
pub(crate) async fn connect_database(settings: &ServerSettings) -> std::io::Result<Option<DbPool>> {
    let Some(url) = settings.database_url() else {
        info!("no database configured; keeping state in memory");
        return Ok(None);
    };
    let config = PoolConfig::new(url)
        .with_max_size(settings.pool_max_size())
        .with_min_idle(Some(settings.pool_min_idle()))
        .with_connect_retries(settings.connect_retries(), settings.connect_retry_delay());
    let pool = DbPool::connect(config)
        .await
        .map_err(|err| std::io::Error::other(format!("database pool: {err}")))?;
    run_migrations(url)
        .await
        .map_err(|err| std::io::Error::other(format!("database migrations: {err}")))?;
    Ok(Some(pool))
}

fn select_store(pool: Option<&DbPool>) -> Arc<dyn ReviewStore> {
    match pool {
        Some(pool) => Arc::new(DieselReviewStore::new(pool.clone())),
        None => Arc::new(InMemoryReviewStore::new()),
    }
}

/// Build the shared HTTP state over the configured store.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    web::Data::new(HttpState::from_store(
        select_store(config.db_pool.as_ref()),
        Arc::new(RandomCandidateSelector::from_entropy()),
        Arc::new(DefaultClock),
        config.operation_timeout,
    ))
}
