//! Post storage composed from a repository and a cache.

mod cached;

pub use cached::{CachedPostStorage, DEFAULT_CACHE_TTL, post_key, posts_by_author_key};
