//! PostgreSQL post repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DbConn, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    SqlErr,
};

use chirp_core::domain::{
    AuthorId, NewPost, PageRequest, PaginationError, Post, PostId, PostPage,
};
use chirp_core::error::RepoError;
use chirp_core::ports::{IdGenerator, PostRepository, UuidV7Generator};
use chirp_core::retry::{RetryPolicy, insert_with_fresh_ids};

use super::entity::post::{self, Entity as PostEntity};

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        || err.to_string().contains("duplicate key")
}

fn query_error(err: DbErr) -> RepoError {
    match err {
        DbErr::Conn(e) => RepoError::Connection(e.to_string()),
        DbErr::ConnectionAcquire(e) => RepoError::Connection(e.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}

/// PostgreSQL post repository.
pub struct PostgresPostRepository {
    db: DbConn,
    ids: Arc<dyn IdGenerator>,
    retry: RetryPolicy,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
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
        let id = post.id.clone();
        let active: post::ActiveModel = post.into();

        PostEntity::insert(active)
            .exec_without_returning(&self.db)
            .await
            .map(|_| ())
            .map_err(|e| {
                if is_unique_violation(&e) {
                    tracing::warn!(post_id = %id, "Post id collision, retrying with a fresh id");
                    RepoError::DuplicateKey(id.to_string())
                } else {
                    query_error(e)
                }
            })
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn save(&self, draft: NewPost) -> Result<Post, RepoError> {
        insert_with_fresh_ids(self.retry, self.ids.as_ref(), draft, |post| self.insert(post)).await
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, RepoError> {
        let row = PostEntity::find_by_id(id.as_str().to_owned())
            .one(&self.db)
            .await
            .map_err(query_error)?;

        row.map(Post::try_from).transpose()
    }

    async fn find_by_author(
        &self,
        author: &AuthorId,
        page: &PageRequest,
    ) -> Result<PostPage, RepoError> {
        let mut query = PostEntity::find().filter(post::Column::AuthorId.eq(author.as_str()));

        if let Some(cursor) = page.cursor()? {
            // The cursor must name one of this author's posts.
            let known = PostEntity::find_by_id(cursor.after().as_str().to_owned())
                .filter(post::Column::AuthorId.eq(author.as_str()))
                .count(&self.db)
                .await
                .map_err(query_error)?;
            if known == 0 {
                return Err(PaginationError::UnknownPosition.into());
            }
            query = query.filter(post::Column::Id.lt(cursor.after().as_str()));
        }

        let rows = query
            .order_by_desc(post::Column::Id)
            .limit(page.fetch_limit())
            .all(&self.db)
            .await
            .map_err(query_error)?;

        let posts = rows
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(author = %author, returned = posts.len(), "Loaded posts page");
        Ok(PostPage::from_overfetch(posts, page))
    }

    async fn update(&self, post: &Post) -> Result<(), RepoError> {
        let modified_at = post.last_modified_at.unwrap_or_else(Utc::now);

        let result = PostEntity::update_many()
            .col_expr(post::Column::Text, Expr::value(post.text.clone()))
            .col_expr(
                post::Column::LastModifiedAt,
                Expr::value(Some(modified_at.fixed_offset())),
            )
            .filter(post::Column::Id.eq(post.id.as_str()))
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
