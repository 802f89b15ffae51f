//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use chirp_core::ports::{Cache, PostRepository, PostStorage};
use chirp_infra::cache::InMemoryCache;
use chirp_infra::database::InMemoryPostRepository;
use chirp_infra::storage::CachedPostStorage;

#[cfg(feature = "postgres")]
use chirp_infra::database::{DatabaseConnections, PostgresPostRepository};
#[cfg(feature = "redis")]
use chirp_infra::cache::RedisCache;

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostStorage>,
    pub request_timeout: Duration,
}

impl AppState {
    /// Wrap an already assembled storage.
    pub fn from_storage(posts: Arc<dyn PostStorage>, request_timeout: Duration) -> Self {
        Self {
            posts,
            request_timeout,
        }
    }

    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let repo = build_repository(config).await;
        let cache = build_cache(config).await;

        let posts = CachedPostStorage::new(repo, cache).with_ttl(config.cache.ttl);
        tracing::info!(ttl_secs = config.cache.ttl.as_secs_f64(), "Application state initialized");

        Self::from_storage(Arc::new(posts), config.request_timeout)
    }
}

fn in_memory_repository(config: &AppConfig) -> Arc<dyn PostRepository> {
    Arc::new(InMemoryPostRepository::new().with_retry_policy(config.retry))
}

#[cfg(feature = "postgres")]
async fn build_repository(config: &AppConfig) -> Arc<dyn PostRepository> {
    let Some(db_config) = &config.database else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return in_memory_repository(config);
    };

    match DatabaseConnections::init(db_config).await {
        Ok(connections) => Arc::new(
            PostgresPostRepository::new(connections.main).with_retry_policy(config.retry),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database. Using in-memory fallback.");
            in_memory_repository(config)
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn build_repository(config: &AppConfig) -> Arc<dyn PostRepository> {
    if config.database.is_some() {
        tracing::warn!("DATABASE_URL ignored: built without postgres feature");
    }
    tracing::info!("Running without postgres feature - using in-memory repository");
    in_memory_repository(config)
}

#[cfg(feature = "redis")]
async fn build_cache(config: &AppConfig) -> Arc<dyn Cache> {
    let Some(redis_config) = &config.cache.redis else {
        tracing::info!("REDIS_URL not set. Using in-memory cache.");
        return Arc::new(InMemoryCache::new());
    };

    match RedisCache::new(redis_config).await {
        Ok(cache) => Arc::new(cache),
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to Redis. Using in-memory cache.");
            Arc::new(InMemoryCache::new())
        }
    }
}

#[cfg(not(feature = "redis"))]
async fn build_cache(_config: &AppConfig) -> Arc<dyn Cache> {
    tracing::info!("Running without redis feature - using in-memory cache");
    Arc::new(InMemoryCache::new())
}
