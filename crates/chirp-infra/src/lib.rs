//! # Chirp Infrastructure
//!
//! Concrete implementations of the ports defined in `chirp-core`:
//! post repositories, caches and the cache-aside post storage.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL post repository via SeaORM
//! - `redis` - Redis cache

pub mod cache;
pub mod database;
pub mod storage;

// Re-exports - In-Memory
pub use cache::InMemoryCache;
pub use database::{DatabaseConfig, InMemoryPostRepository};
pub use storage::CachedPostStorage;

// Re-exports - External backends
#[cfg(feature = "redis")]
pub use cache::{RedisCache, RedisConfig};
#[cfg(feature = "postgres")]
pub use database::{DatabaseConnections, PostgresPostRepository};
