//! Bounded retry of inserts that hit an identifier collision.

use std::future::Future;

use chrono::Utc;

use crate::domain::{NewPost, Post};
use crate::error::RepoError;
use crate::ports::IdGenerator;

/// Default number of insert attempts before giving up on a collision.
pub const DEFAULT_SAVE_ATTEMPTS: u32 = 5;

/// How many times an insert is retried with a fresh identifier. No backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_ATTEMPTS)
    }
}

/// Assign an id to `draft` and hand it to `insert`, drawing a new id each
/// time `insert` reports [`RepoError::DuplicateKey`]. Any other error ends
/// the loop immediately.
pub async fn insert_with_fresh_ids<F, Fut>(
    policy: RetryPolicy,
    ids: &dyn IdGenerator,
    draft: NewPost,
    mut insert: F,
) -> Result<Post, RepoError>
where
    F: FnMut(Post) -> Fut,
    Fut: Future<Output = Result<(), RepoError>>,
{
    let created_at = Utc::now();

    for _ in 0..policy.max_attempts {
        let post = draft.clone().into_post(ids.next_id(), created_at);
        match insert(post.clone()).await {
            Ok(()) => return Ok(post),
            Err(RepoError::DuplicateKey(_)) => continue,
            Err(e) => return Err(e),
        }
    }

    Err(RepoError::Collision {
        attempts: policy.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::domain::{AuthorId, PostId};

    struct Counting(AtomicU32);

    impl IdGenerator for Counting {
        fn next_id(&self) -> PostId {
            PostId::new(format!("id{}", self.0.fetch_add(1, Ordering::SeqCst)))
        }
    }

    fn draft() -> NewPost {
        NewPost::new(AuthorId::parse("alice").unwrap(), "hello".into())
    }

    #[tokio::test]
    async fn test_retries_with_new_id_after_duplicate() {
        let ids = Counting(AtomicU32::new(0));
        let calls = AtomicU32::new(0);

        let post = insert_with_fresh_ids(RetryPolicy::default(), &ids, draft(), |post| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(RepoError::DuplicateKey(post.id.to_string()))
                } else {
                    Ok(())
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(post.id.as_str(), "id1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let ids = Counting(AtomicU32::new(0));
        let calls = AtomicU32::new(0);

        let result = insert_with_fresh_ids(RetryPolicy::default(), &ids, draft(), |post| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(RepoError::DuplicateKey(post.id.to_string())) }
        })
        .await;

        assert!(matches!(result, Err(RepoError::Collision { attempts: 5 })));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let ids = Counting(AtomicU32::new(0));
        let calls = AtomicU32::new(0);

        let result = insert_with_fresh_ids(RetryPolicy::default(), &ids, draft(), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(RepoError::Query("boom".into())) }
        })
        .await;

        assert!(matches!(result, Err(RepoError::Query(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
