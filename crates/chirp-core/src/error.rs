//! Domain-level error types.

use thiserror::Error;

use crate::context::Interrupted;
use crate::domain::PaginationError;

/// Domain errors - what a caller of the post storage can observe.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid page: {0}")]
    InvalidPage(String),

    #[error("Only the author may modify this post")]
    Forbidden,

    #[error("Identifier collision after {attempts} attempts")]
    Collision { attempts: u32 },

    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation deadline exceeded")]
    DeadlineExceeded,
}

impl DomainError {
    pub fn post_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "post",
            id: id.into(),
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Identifier collision after {attempts} attempts")]
    Collision { attempts: u32 },

    #[error(transparent)]
    InvalidPage(#[from] PaginationError),
}

impl From<PaginationError> for DomainError {
    fn from(err: PaginationError) -> Self {
        match err {
            PaginationError::InvalidSize(_) => DomainError::Validation(err.to_string()),
            other => DomainError::InvalidPage(other.to_string()),
        }
    }
}

impl From<Interrupted> for DomainError {
    fn from(err: Interrupted) -> Self {
        match err {
            Interrupted::Cancelled => DomainError::Cancelled,
            Interrupted::DeadlineExceeded => DomainError::DeadlineExceeded,
        }
    }
}

/// Repository errors keep their kind when they cross into the domain. A
/// missing row only becomes `NotFound` where the caller knows which entity
/// was asked for.
impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => DomainError::NotFound {
                entity_type: "entity",
                id: String::new(),
            },
            RepoError::Collision { attempts } => DomainError::Collision { attempts },
            RepoError::InvalidPage(inner) => inner.into(),
            RepoError::Connection(msg) => DomainError::Storage(format!("connection: {msg}")),
            RepoError::Query(msg) => DomainError::Storage(msg),
            RepoError::DuplicateKey(msg) => DomainError::Storage(format!("duplicate key: {msg}")),
        }
    }
}
