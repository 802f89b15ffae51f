//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod cache;
mod repository;
mod storage;

pub use cache::{Cache, CacheError};
pub use repository::{IdGenerator, PostRepository, UuidV7Generator};
pub use storage::PostStorage;
