//! In-memory post repository - used in tests and when no database is configured.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use chirp_core::domain::{
    AuthorId, NewPost, PageRequest, PaginationError, Post, PostId, PostPage,
};
use chirp_core::error::RepoError;
use chirp_core::ports::{IdGenerator, PostRepository, UuidV7Generator};
use chirp_core::retry::{RetryPolicy, insert_with_fresh_ids};

#[derive(Default)]
struct Tables {
    posts: HashMap<PostId, Post>,
    by_author: HashMap<AuthorId, BTreeSet<PostId>>,
}

/// Post repository over two maps behind a single lock.
///
/// Every mutation takes the write lock, so readers never observe a post in
/// one map but not the other. Data is lost on process restart.
pub struct InMemoryPostRepository {
    tables: RwLock<Tables>,
    ids: Arc<dyn IdGenerator>,
    retry: RetryPolicy,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            ids: Arc::new(UuidV7Generator),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn insert(&self, post: Post) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.posts.contains_key(&post.id) {
            tracing::warn!(post_id = %post.id, "Post id collision, retrying with a fresh id");
            return Err(RepoError::DuplicateKey(post.id.to_string()));
        }

        tables
            .by_author
            .entry(post.author_id.clone())
            .or_default()
            .insert(post.id.clone());
        tables.posts.insert(post.id.clone(), post);
        Ok(())
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn save(&self, draft: NewPost) -> Result<Post, RepoError> {
        insert_with_fresh_ids(self.retry, self.ids.as_ref(), draft, |post| self.insert(post)).await
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(id).cloned())
    }

    async fn find_by_author(
        &self,
        author: &AuthorId,
        page: &PageRequest,
    ) -> Result<PostPage, RepoError> {
        let cursor = page.cursor()?;
        let tables = self.tables.read().await;

        let Some(ids) = tables.by_author.get(author) else {
            if cursor.is_some() {
                return Err(PaginationError::UnknownPosition.into());
            }
            return Ok(PostPage::empty());
        };

        let newest_first: Box<dyn Iterator<Item = &PostId>> = match &cursor {
            Some(cursor) => {
                if !ids.contains(cursor.after()) {
                    return Err(PaginationError::UnknownPosition.into());
                }
                Box::new(ids.range(..cursor.after().clone()).rev())
            }
            None => Box::new(ids.iter().rev()),
        };

        let posts = newest_first
            .take(page.fetch_limit() as usize)
            .filter_map(|id| tables.posts.get(id).cloned())
            .collect();

        Ok(PostPage::from_overfetch(posts, page))
    }

    async fn update(&self, post: &Post) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let stored = tables.posts.get_mut(&post.id).ok_or(RepoError::NotFound)?;

        stored.text = post.text.clone();
        stored.last_modified_at = post.last_modified_at;
        Ok(())
    }
}
