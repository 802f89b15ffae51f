use async_trait::async_trait;

use crate::domain::{AuthorId, NewPost, PageRequest, Post, PostId, PostPage};
use crate::error::RepoError;

/// Durable post store.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Store a new post, assigning its id and creation time. Identifier
    /// collisions are retried with fresh ids up to the adapter's retry policy.
    async fn save(&self, draft: NewPost) -> Result<Post, RepoError>;

    /// Find a post by its id.
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, RepoError>;

    /// One page of an author's posts, newest first.
    async fn find_by_author(
        &self,
        author: &AuthorId,
        page: &PageRequest,
    ) -> Result<PostPage, RepoError>;

    /// Overwrite the text and modification time of an existing post.
    /// Returns [`RepoError::NotFound`] when no such post exists.
    async fn update(&self, post: &Post) -> Result<(), RepoError>;
}

/// Source of fresh post identifiers.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> PostId;
}

/// Time-ordered UUIDv7 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV7Generator;

impl IdGenerator for UuidV7Generator {
    fn next_id(&self) -> PostId {
        PostId::generate()
    }
}
