//! The post storage capability consumed by request handlers.

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::domain::{AuthorId, PageRequest, Post, PostId, PostPage};
use crate::error::DomainError;

#[async_trait]
pub trait PostStorage: Send + Sync {
    /// Publish a new post on behalf of `author`.
    async fn create_post(
        &self,
        ctx: &RequestContext,
        author: AuthorId,
        text: String,
    ) -> Result<Post, DomainError>;

    async fn get_post(&self, ctx: &RequestContext, id: &PostId) -> Result<Post, DomainError>;

    async fn get_posts_by_author(
        &self,
        ctx: &RequestContext,
        author: &AuthorId,
        page: &PageRequest,
    ) -> Result<PostPage, DomainError>;

    /// Replace the text of a post. Only its author may do so.
    async fn update_post(
        &self,
        ctx: &RequestContext,
        id: &PostId,
        caller: &AuthorId,
        text: String,
    ) -> Result<Post, DomainError>;
}
