//! Cursor pagination over an author's posts, newest first.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::post::{Post, PostId};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("page size must be positive, got {0}")]
    InvalidSize(i64),

    #[error("malformed page token: {0}")]
    InvalidToken(String),

    #[error("page token was issued for page size {issued}, got {requested}")]
    SizeMismatch { issued: u32, requested: u32 },

    #[error("page token does not point at a known position")]
    UnknownPosition,
}

#[derive(Debug, Serialize, Deserialize)]
struct CursorPayload {
    size: u32,
    after: PostId,
}

/// Decoded form of a page token: "continue after this post, `size` at a time".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    size: u32,
    after: PostId,
}

impl PageCursor {
    pub fn new(size: u32, after: PostId) -> Self {
        Self { size, after }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Last post of the previous page; the next page starts strictly below it.
    pub fn after(&self) -> &PostId {
        &self.after
    }

    pub fn encode(&self) -> PageToken {
        let payload = CursorPayload {
            size: self.size,
            after: self.after.clone(),
        };
        // Serializing a struct of a u32 and a string cannot fail.
        let serialized = serde_json::to_vec(&payload).unwrap_or_default();
        PageToken(URL_SAFE_NO_PAD.encode(serialized))
    }

    pub fn decode(token: &PageToken) -> Result<Self, PaginationError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.as_str())
            .map_err(|err| PaginationError::InvalidToken(err.to_string()))?;
        let payload: CursorPayload = serde_json::from_slice(&bytes)
            .map_err(|err| PaginationError::InvalidToken(err.to_string()))?;
        Ok(Self {
            size: payload.size,
            after: payload.after,
        })
    }
}

/// Opaque continuation token handed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageToken(String);

impl PageToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Empty strings mean "first page".
    pub fn from_query(raw: Option<&str>) -> Option<Self> {
        raw.filter(|s| !s.is_empty()).map(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated request for one page of an author's posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    size: u32,
    token: Option<PageToken>,
}

impl PageRequest {
    pub fn new(size: i64, token: Option<PageToken>) -> Result<Self, PaginationError> {
        let size = u32::try_from(size)
            .ok()
            .filter(|s| *s > 0)
            .ok_or(PaginationError::InvalidSize(size))?;
        Ok(Self { size, token })
    }

    pub fn first(size: u32) -> Result<Self, PaginationError> {
        Self::new(i64::from(size), None)
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn token(&self) -> Option<&PageToken> {
        self.token.as_ref()
    }

    /// Number of rows an adapter should fetch: one extra tells whether a
    /// next page exists.
    pub fn fetch_limit(&self) -> u64 {
        u64::from(self.size) + 1
    }

    /// Decode the token and check it was issued for this page size.
    pub fn cursor(&self) -> Result<Option<PageCursor>, PaginationError> {
        let Some(token) = &self.token else {
            return Ok(None);
        };
        let cursor = PageCursor::decode(token)?;
        if cursor.size != self.size {
            return Err(PaginationError::SizeMismatch {
                issued: cursor.size,
                requested: self.size,
            });
        }
        Ok(Some(cursor))
    }
}

/// One page of an author's posts, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub next_page: Option<PageToken>,
}

impl PostPage {
    pub fn empty() -> Self {
        Self {
            posts: Vec::new(),
            next_page: None,
        }
    }

    /// Build a page from rows fetched with [`PageRequest::fetch_limit`],
    /// already sorted newest first.
    pub fn from_overfetch(mut posts: Vec<Post>, request: &PageRequest) -> Self {
        let size = request.size() as usize;
        if posts.len() <= size {
            return Self {
                posts,
                next_page: None,
            };
        }

        posts.truncate(size);
        let next_page = posts
            .last()
            .map(|last| PageCursor::new(request.size(), last.id.clone()).encode());
        Self { posts, next_page }
    }

    pub fn is_last(&self) -> bool {
        self.next_page.is_none()
    }
}
