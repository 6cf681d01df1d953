//! Server settings loaded via OrthoConfig.
//!
//! Every value can come from the command line, a `REVIEWER_*` environment
//! variable, or a configuration file. Unset values fall back to the defaults
//! exposed by the accessors.

use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_POOL_MIN_IDLE: u32 = 2;
const DEFAULT_CONNECT_RETRIES: u32 = 10;
const DEFAULT_CONNECT_RETRY_DELAY_MS: u64 = 2_000;

/// Configuration values for the HTTP server and its store.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REVIEWER")]
pub struct ServerSettings {
    /// Socket address to listen on.
    #[ortho_config(default = "0.0.0.0:8080".to_owned())]
    pub bind_addr: String,
    /// PostgreSQL URL. Without one the server keeps state in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled connections.
    pub pool_max_size: Option<u32>,
    /// Idle connections kept warm.
    pub pool_min_idle: Option<u32>,
    /// Attempts made to reach the database at start-up.
    pub connect_retries: Option<u32>,
    /// Pause between start-up connection attempts.
    pub connect_retry_delay_ms: Option<u64>,
    /// Deadline applied to each unit of work.
    pub operation_timeout_ms: Option<u64>,
}

impl ServerSettings {
    /// Parse the configured bind address.
    ///
    /// # Errors
    ///
    /// Returns [`AddrParseError`] when the configured value is not a socket
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.bind_addr.trim().parse()
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    pub fn pool_min_idle(&self) -> u32 {
        self.pool_min_idle
            .unwrap_or(DEFAULT_POOL_MIN_IDLE)
            .min(self.pool_max_size())
    }

    pub fn connect_retries(&self) -> u32 {
        self.connect_retries.unwrap_or(DEFAULT_CONNECT_RETRIES)
    }

    pub fn connect_retry_delay(&self) -> Duration {
        Duration::from_millis(
            self.connect_retry_delay_ms
                .unwrap_or(DEFAULT_CONNECT_RETRY_DELAY_MS),
        )
    }

    /// Per-operation deadline; `None` lets units run to completion.
    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 7] = [
        "REVIEWER_BIND_ADDR",
        "REVIEWER_DATABASE_URL",
        "REVIEWER_POOL_MAX_SIZE",
        "REVIEWER_POOL_MIN_IDLE",
        "REVIEWER_CONNECT_RETRIES",
        "REVIEWER_CONNECT_RETRY_DELAY_MS",
        "REVIEWER_OPERATION_TIMEOUT_MS",
    ];

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("reviewer-backend")])
            .expect("config should load")
    }

    fn cleared() -> Vec<(&'static str, Option<String>)> {
        VARS.iter().map(|name| (*name, None)).collect()
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(cleared());

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("default addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal addr")
        );
        assert!(settings.database_url().is_none());
        assert_eq!(settings.pool_max_size(), 10);
        assert_eq!(settings.pool_min_idle(), 2);
        assert_eq!(settings.connect_retries(), 10);
        assert_eq!(settings.connect_retry_delay(), Duration::from_secs(2));
        assert!(settings.operation_timeout().is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let mut vars = cleared();
        vars.extend([
            ("REVIEWER_BIND_ADDR", Some("127.0.0.1:9090".to_owned())),
            (
                "REVIEWER_DATABASE_URL",
                Some("postgres://localhost/reviews".to_owned()),
            ),
            ("REVIEWER_POOL_MAX_SIZE", Some("4".to_owned())),
            ("REVIEWER_CONNECT_RETRIES", Some("3".to_owned())),
            ("REVIEWER_OPERATION_TIMEOUT_MS", Some("250".to_owned())),
        ]);
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("configured addr").port(),
            9090
        );
        assert_eq!(
            settings.database_url(),
            Some("postgres://localhost/reviews")
        );
        assert_eq!(settings.pool_max_size(), 4);
        assert_eq!(settings.pool_min_idle(), 2);
        assert_eq!(settings.connect_retries(), 3);
        assert_eq!(
            settings.operation_timeout(),
            Some(Duration::from_millis(250))
        );
    }

    #[rstest]
    #[case(Some("   "), None)]
    #[case(Some(""), None)]
    #[case(Some("postgres://db/r"), Some("postgres://db/r"))]
    fn blank_database_url_means_in_memory(
        #[case] raw: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let settings = ServerSettings {
            bind_addr: "0.0.0.0:8080".to_owned(),
            database_url: raw.map(str::to_owned),
            pool_max_size: None,
            pool_min_idle: None,
            connect_retries: None,
            connect_retry_delay_ms: None,
            operation_timeout_ms: None,
        };

        assert_eq!(settings.database_url(), expected);
    }

    #[rstest]
    fn min_idle_never_exceeds_max_size() {
        let settings = ServerSettings {
            bind_addr: "0.0.0.0:8080".to_owned(),
            database_url: None,
            pool_max_size: Some(1),
            pool_min_idle: Some(5),
            connect_retries: None,
            connect_retry_delay_ms: None,
            operation_timeout_ms: Some(0),
        };

        assert_eq!(settings.pool_min_idle(), 1);
        assert!(settings.operation_timeout().is_none());
    }
}
