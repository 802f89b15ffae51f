//! Cache-aside post storage.
//!
//! Reads try the cache first and fall back to the repository on a miss,
//! repopulating the cache. Writes hit the repository first and then refresh
//! the single-post entry. Cache entries are never invalidated explicitly;
//! they expire after the TTL, so listings may lag an update by up to one
//! TTL window.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use chirp_core::context::RequestContext;
use chirp_core::domain::{AuthorId, NewPost, PageRequest, Post, PostId, PostPage};
use chirp_core::error::{DomainError, RepoError};
use chirp_core::ports::{Cache, CacheError, PostRepository, PostStorage};

/// How long a cached post or page stays valid.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10);

/// Cache key of a single post.
pub fn post_key(id: &PostId) -> String {
    format!("post:{id}")
}

/// Cache key of one page of an author's posts. The first page uses an empty
/// token segment.
pub fn posts_by_author_key(author: &AuthorId, page: &PageRequest) -> String {
    let token = page.token().map(|t| t.as_str()).unwrap_or_default();
    format!("posts:{author};{};{token}", page.size())
}

fn log_cache_error(op: &'static str, key: &str, err: &CacheError) {
    match err {
        CacheError::Connection(_) => {
            tracing::error!(op, key = %key, error = %err, "Cache unreachable, using repository")
        }
        _ => tracing::warn!(op, key = %key, error = %err, "Cache operation failed"),
    }
}

/// [`PostStorage`] that fronts a [`PostRepository`] with a TTL [`Cache`].
pub struct CachedPostStorage {
    repo: Arc<dyn PostRepository>,
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl CachedPostStorage {
    pub fn new(repo: Arc<dyn PostRepository>, cache: Arc<dyn Cache>) -> Self {
        Self {
            repo,
            cache,
            ttl: DEFAULT_CACHE_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look `key` up in the cache. Cache failures and undecodable values
    /// count as misses; only cancellation is returned as an error.
    async fn cached<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        key: &str,
    ) -> Result<Option<T>, DomainError> {
        let raw = match ctx.run(self.cache.get(key)).await? {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key = %key, "Cache miss");
                return Ok(None);
            }
            Err(e) => {
                log_cache_error("get", key, &e);
                return Ok(None);
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                tracing::debug!(key = %key, "Cache hit");
                Ok(Some(value))
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                Ok(None)
            }
        }
    }

    /// Best-effort write of `value` under `key` with the configured TTL.
    ///
    /// Runs after the repository call has succeeded, so an interrupted
    /// write is abandoned rather than reported.
    async fn store<T: Serialize>(&self, ctx: &RequestContext, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                let err = CacheError::Serialization(e.to_string());
                log_cache_error("set", key, &err);
                return;
            }
        };

        match ctx.run(self.cache.set(key, &raw, Some(self.ttl))).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log_cache_error("set", key, &e),
            Err(interrupted) => {
                tracing::debug!(key = %key, reason = %interrupted, "Cache write abandoned")
            }
        }
    }

    async fn load_post(&self, ctx: &RequestContext, id: &PostId) -> Result<Post, DomainError> {
        ctx.run(self.repo.find_by_id(id))
            .await??
            .ok_or_else(|| DomainError::post_not_found(id.as_str()))
    }
}

#[async_trait]
impl PostStorage for CachedPostStorage {
    async fn create_post(
        &self,
        ctx: &RequestContext,
        author: AuthorId,
        text: String,
    ) -> Result<Post, DomainError> {
        let post = ctx.run(self.repo.save(NewPost::new(author, text))).await??;
        tracing::info!(post_id = %post.id, author = %post.author_id, "Post created");

        self.store(ctx, &post_key(&post.id), &post).await;
        Ok(post)
    }

    async fn get_post(&self, ctx: &RequestContext, id: &PostId) -> Result<Post, DomainError> {
        let key = post_key(id);
        if let Some(post) = self.cached::<Post>(ctx, &key).await? {
            return Ok(post);
        }

        let post = self.load_post(ctx, id).await?;
        self.store(ctx, &key, &post).await;
        Ok(post)
    }

    async fn get_posts_by_author(
        &self,
        ctx: &RequestContext,
        author: &AuthorId,
        page: &PageRequest,
    ) -> Result<PostPage, DomainError> {
        let key = posts_by_author_key(author, page);
        if let Some(cached) = self.cached::<PostPage>(ctx, &key).await? {
            return Ok(cached);
        }

        let loaded = ctx.run(self.repo.find_by_author(author, page)).await??;
        self.store(ctx, &key, &loaded).await;
        Ok(loaded)
    }

    async fn update_post(
        &self,
        ctx: &RequestContext,
        id: &PostId,
        caller: &AuthorId,
        text: String,
    ) -> Result<Post, DomainError> {
        // Authorization is checked against the repository, not the cache.
        let mut post = self.load_post(ctx, id).await?;
        if !post.is_authored_by(caller) {
            tracing::warn!(post_id = %id, caller = %caller, "Rejected update by non-author");
            return Err(DomainError::Forbidden);
        }

        post.edit(text);
        match ctx.run(self.repo.update(&post)).await? {
            Ok(()) => {}
            Err(RepoError::NotFound) => return Err(DomainError::post_not_found(id.as_str())),
            Err(e) => return Err(e.into()),
        }
        tracing::info!(post_id = %id, "Post updated");

        self.store(ctx, &post_key(id), &post).await;
        Ok(post)
    }
}
