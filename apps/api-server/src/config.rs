//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use chirp_core::RetryPolicy;
use chirp_core::retry::DEFAULT_SAVE_ATTEMPTS;
use chirp_infra::database::DatabaseConfig;
use chirp_infra::storage::DEFAULT_CACHE_TTL;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub cache: CacheSettings,
    pub retry: RetryPolicy,
    /// Upper bound on the storage work done for a single request.
    pub request_timeout: Duration,
}

/// Cache backend selection and entry lifetime.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub ttl: Duration,
    #[cfg(feature = "redis")]
    pub redis: Option<chirp_infra::cache::RedisConfig>,
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT").unwrap_or(8080),
            database: DatabaseConfig::from_env(),
            cache: CacheSettings {
                ttl: parsed("CACHE_TTL_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_CACHE_TTL),
                #[cfg(feature = "redis")]
                redis: chirp_infra::cache::RedisConfig::from_env(),
            },
            retry: RetryPolicy::new(parsed("SAVE_MAX_ATTEMPTS").unwrap_or(DEFAULT_SAVE_ATTEMPTS)),
            request_timeout: parsed("REQUEST_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(Duration::from_secs(5)),
        }
    }
}
