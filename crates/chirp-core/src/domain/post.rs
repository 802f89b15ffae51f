use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Unique post identifier.
///
/// Generated ids are UUIDv7 values in their 32-character lowercase hex form,
/// so byte-wise ordering follows creation time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh time-ordered identifier.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a post author, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorId(String);

impl AuthorId {
    /// Parse a caller-supplied author id. Only `[0-9a-z]+` is accepted.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let valid = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase());

        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(DomainError::Validation(format!("invalid author id {raw:?}")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Post entity - a short text published by one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub text: String,
    pub author_id: AuthorId,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Replace the text and stamp the modification time.
    pub fn edit(&mut self, text: String) {
        self.text = text;
        self.last_modified_at = Some(Utc::now());
    }

    pub fn is_authored_by(&self, author: &AuthorId) -> bool {
        &self.author_id == author
    }
}

/// A post that has not been stored yet. The repository assigns its id and
/// creation time.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: AuthorId,
    pub text: String,
}

impl NewPost {
    pub fn new(author_id: AuthorId, text: String) -> Self {
        Self { author_id, text }
    }

    pub fn into_post(self, id: PostId, created_at: DateTime<Utc>) -> Post {
        Post {
            id,
            text: self.text,
            author_id: self.author_id,
            created_at,
            last_modified_at: None,
        }
    }
}
