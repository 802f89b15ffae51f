use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};

use chirp_core::domain::{AuthorId, NewPost, PageCursor, PageRequest, Post, PostId};
use chirp_core::error::RepoError;
use chirp_core::ports::{IdGenerator, PostRepository};

use crate::database::entity::post;
use crate::database::postgres_repo::PostgresPostRepository;

struct Sequential(AtomicU32);

impl IdGenerator for Sequential {
    fn next_id(&self) -> PostId {
        PostId::new(format!("id{}", self.0.fetch_add(1, Ordering::SeqCst)))
    }
}

fn row(id: &str, author: &str, text: &str) -> post::Model {
    post::Model {
        id: id.to_owned(),
        text: text.to_owned(),
        author_id: author.to_owned(),
        created_at: Utc::now().into(),
        last_modified_at: None,
    }
}

fn duplicate_key() -> DbErr {
    DbErr::Custom("duplicate key value violates unique constraint \"posts_pkey\"".to_owned())
}

#[tokio::test]
async fn test_find_post_by_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row("p1", "alice", "Test Post")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let post: Post = repo
        .find_by_id(&PostId::new("p1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(post.text, "Test Post");
    assert_eq!(post.author_id.as_str(), "alice");
}

#[tokio::test]
async fn test_find_missing_post() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    assert!(repo.find_by_id(&PostId::new("nope")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_save_retries_on_duplicate_key() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_errors([duplicate_key()])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db)
        .with_id_generator(Arc::new(Sequential(AtomicU32::new(0))));

    let saved = repo
        .save(NewPost::new(AuthorId::parse("alice").unwrap(), "hi".into()))
        .await
        .unwrap();
    assert_eq!(saved.id.as_str(), "id1");
}

#[tokio::test]
async fn test_save_gives_up_after_five_collisions() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_errors((0..5).map(|_| duplicate_key()))
        .into_connection();

    let repo = PostgresPostRepository::new(db)
        .with_id_generator(Arc::new(Sequential(AtomicU32::new(0))));

    let result = repo
        .save(NewPost::new(AuthorId::parse("alice").unwrap(), "hi".into()))
        .await;
    assert!(matches!(result, Err(RepoError::Collision { attempts: 5 })));
}

#[tokio::test]
async fn test_first_page_overfetches_one_row() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            row("p3", "alice", "c"),
            row("p2", "alice", "b"),
            row("p1", "alice", "a"),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let request = PageRequest::first(2).unwrap();

    let page = repo
        .find_by_author(&AuthorId::parse("alice").unwrap(), &request)
        .await
        .unwrap();

    let texts: Vec<_> = page.posts.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(texts, ["c", "b"]);
    let cursor = PageCursor::decode(page.next_page.as_ref().unwrap()).unwrap();
    assert_eq!(cursor.after().as_str(), "p2");
}

#[tokio::test]
async fn test_mismatched_page_size_never_reaches_database() {
    // No results queued: any query would fail the test with a mock error.
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let repo = PostgresPostRepository::new(db);

    let token = PageCursor::new(2, PostId::new("p2")).encode();
    let request = PageRequest::new(3, Some(token)).unwrap();

    let result = repo
        .find_by_author(&AuthorId::parse("alice").unwrap(), &request)
        .await;
    assert!(matches!(result, Err(RepoError::InvalidPage(_))));
}

#[tokio::test]
async fn test_update_missing_post() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let ghost = NewPost::new(AuthorId::parse("alice").unwrap(), "boo".into())
        .into_post(PostId::new("nope"), Utc::now());

    assert!(matches!(repo.update(&ghost).await, Err(RepoError::NotFound)));
}
