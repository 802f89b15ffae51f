//! # Chirp Core
//!
//! The domain layer of the Chirp microblog service.
//! Entities, pagination cursors and the ports the infrastructure implements.

pub mod context;
pub mod domain;
pub mod error;
pub mod ports;
pub mod retry;

pub use context::{Interrupted, RequestContext};
pub use error::{DomainError, RepoError};
pub use retry::RetryPolicy;
