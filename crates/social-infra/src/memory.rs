//! In-memory stores - used as the fallback when no database is configured
//! and as a backend-free test double.
//!
//! Mirrors the relational schema: foreign keys are checked on insert, unique
//! keys raise `Conflict`, and deleting a post drops its comments.
//! Note: Data is lost on process restart.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use social_core::domain::{
    Comment, NewComment, NewPost, NewUser, Post, PostWithMetadata, User, UserSummary,
};
use social_core::ports::{CommentRepository, FollowerRepository, PostRepository, UserRepository};
use social_core::{Ctx, RepoError, Storage};

use crate::bounded::bounded;

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    /// (follower_id, user_id)
    followers: BTreeSet<(i64, i64)>,
    next_user_id: i64,
    next_post_id: i64,
    next_comment_id: i64,
}

impl Tables {
    fn require_user(&self, id: i64, constraint: &str) -> Result<(), RepoError> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(RepoError::Constraint(format!(
                "{constraint}: user {id} does not exist"
            )))
        }
    }

    fn summary(&self, user_id: i64) -> Option<UserSummary> {
        self.users.get(&user_id).map(UserSummary::from)
    }
}

/// All four stores over one shared set of tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Build a [`Storage`] whose stores share one in-memory dataset.
pub fn in_memory_storage() -> Storage {
    let store = Arc::new(InMemoryStore::new());
    Storage::new(store.clone(), store.clone(), store.clone(), store)
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create(&self, ctx: &Ctx, new_post: NewPost) -> Result<Post, RepoError> {
        bounded(ctx, async {
            let mut tables = self.tables.write().await;
            tables.require_user(new_post.user_id, "posts_user_id_fkey")?;

            tables.next_post_id += 1;
            let now = Utc::now();
            let post = Post {
                id: tables.next_post_id,
                user_id: new_post.user_id,
                title: new_post.title,
                content: new_post.content,
                tags: new_post.tags,
                version: 1,
                created_at: now,
                updated_at: now,
                comments: Vec::new(),
                user: None,
            };
            tables.posts.insert(post.id, post.clone());

            Ok(post)
        })
        .await
    }

    async fn get_by_id(&self, ctx: &Ctx, id: i64) -> Result<Post, RepoError> {
        bounded(ctx, async {
            let tables = self.tables.read().await;
            tables.posts.get(&id).cloned().ok_or(RepoError::NotFound)
        })
        .await
    }

    async fn list(&self, ctx: &Ctx) -> Result<Vec<Post>, RepoError> {
        bounded(ctx, async {
            let tables = self.tables.read().await;
            Ok(tables.posts.values().cloned().collect())
        })
        .await
    }

    async fn update(&self, ctx: &Ctx, edited: Post) -> Result<Post, RepoError> {
        bounded(ctx, async {
            // Check and write under one write lock, like the conditional UPDATE.
            let mut tables = self.tables.write().await;
            let stored = tables
                .posts
                .get_mut(&edited.id)
                .filter(|stored| stored.version == edited.version)
                .ok_or(RepoError::NotFound)?;

            stored.title = edited.title;
            stored.content = edited.content;
            stored.version += 1;
            stored.updated_at = Utc::now();

            Ok(stored.clone())
        })
        .await
    }

    async fn delete(&self, ctx: &Ctx, id: i64) -> Result<(), RepoError> {
        bounded(ctx, async {
            let mut tables = self.tables.write().await;
            if tables.posts.remove(&id).is_none() {
                return Err(RepoError::NotFound);
            }
            tables.comments.retain(|_, comment| comment.post_id != id);
            Ok(())
        })
        .await
    }

    async fn get_user_feed(
        &self,
        ctx: &Ctx,
        user_id: i64,
    ) -> Result<Vec<PostWithMetadata>, RepoError> {
        bounded(ctx, async {
            let tables = self.tables.read().await;

            let mut feed: Vec<PostWithMetadata> = tables
                .posts
                .values()
                .filter(|post| {
                    post.user_id == user_id || tables.followers.contains(&(user_id, post.user_id))
                })
                .map(|post| {
                    let comment_count = tables
                        .comments
                        .values()
                        .filter(|comment| comment.post_id == post.id)
                        .count() as i64;

                    let mut post = post.clone();
                    post.user = tables.summary(post.user_id);

                    PostWithMetadata {
                        post,
                        comment_count,
                    }
                })
                .collect();

            feed.sort_by(|a, b| {
                b.post
                    .created_at
                    .cmp(&a.post.created_at)
                    .then(b.post.id.cmp(&a.post.id))
            });

            Ok(feed)
        })
        .await
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, ctx: &Ctx, new_user: NewUser) -> Result<User, RepoError> {
        bounded(ctx, async {
            let mut tables = self.tables.write().await;

            if tables
                .users
                .values()
                .any(|user| user.username == new_user.username)
            {
                return Err(RepoError::Conflict("users_username_key".to_string()));
            }
            if tables.users.values().any(|user| user.email == new_user.email) {
                return Err(RepoError::Conflict("users_email_key".to_string()));
            }

            tables.next_user_id += 1;
            let user = User {
                id: tables.next_user_id,
                username: new_user.username,
                email: new_user.email,
                created_at: Utc::now(),
            };
            tables.users.insert(user.id, user.clone());

            Ok(user)
        })
        .await
    }

    async fn get_by_id(&self, ctx: &Ctx, id: i64) -> Result<User, RepoError> {
        bounded(ctx, async {
            let tables = self.tables.read().await;
            tables.users.get(&id).cloned().ok_or(RepoError::NotFound)
        })
        .await
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create(&self, ctx: &Ctx, new_comment: NewComment) -> Result<Comment, RepoError> {
        bounded(ctx, async {
            let mut tables = self.tables.write().await;

            if !tables.posts.contains_key(&new_comment.post_id) {
                return Err(RepoError::Constraint(format!(
                    "comments_post_id_fkey: post {} does not exist",
                    new_comment.post_id
                )));
            }
            tables.require_user(new_comment.user_id, "comments_user_id_fkey")?;

            tables.next_comment_id += 1;
            let comment = Comment {
                id: tables.next_comment_id,
                post_id: new_comment.post_id,
                user_id: new_comment.user_id,
                user: None,
                content: new_comment.content,
                created_at: Utc::now(),
            };
            tables.comments.insert(comment.id, comment.clone());

            Ok(comment)
        })
        .await
    }

    async fn get_by_post_id(&self, ctx: &Ctx, post_id: i64) -> Result<Vec<Comment>, RepoError> {
        bounded(ctx, async {
            let tables = self.tables.read().await;

            let mut comments: Vec<Comment> = tables
                .comments
                .values()
                .filter(|comment| comment.post_id == post_id)
                .filter_map(|comment| {
                    // Inner join: a comment without an author row is not returned.
                    let author = tables.summary(comment.user_id)?;
                    Some(Comment {
                        user: Some(author),
                        ..comment.clone()
                    })
                })
                .collect();

            comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

            Ok(comments)
        })
        .await
    }
}

#[async_trait]
impl FollowerRepository for InMemoryStore {
    async fn follow(&self, ctx: &Ctx, follower_id: i64, user_id: i64) -> Result<(), RepoError> {
        bounded(ctx, async {
            let mut tables = self.tables.write().await;
            tables.require_user(follower_id, "followers_follower_id_fkey")?;
            tables.require_user(user_id, "followers_user_id_fkey")?;

            if !tables.followers.insert((follower_id, user_id)) {
                return Err(RepoError::Conflict("followers_pkey".to_string()));
            }

            Ok(())
        })
        .await
    }

    async fn unfollow(&self, ctx: &Ctx, follower_id: i64, user_id: i64) -> Result<(), RepoError> {
        bounded(ctx, async {
            let mut tables = self.tables.write().await;
            tables.followers.remove(&(follower_id, user_id));
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn user(storage: &Storage, name: &str) -> User {
        storage
            .users
            .create(
                &Ctx::background(),
                NewUser::new(name, format!("{name}@example.com")),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips() {
        let storage = in_memory_storage();
        let ctx = Ctx::background();
        let author = user(&storage, "alice").await;

        let created = storage
            .posts
            .create(
                &ctx,
                NewPost::new(author.id, "Hello", "World").with_tags(["intro"]),
            )
            .await
            .unwrap();
        let fetched = storage.posts.get_by_id(&ctx, created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.version, 1);
        assert_eq!(fetched.user_id, author.id);
        assert_eq!(fetched.tags, vec!["intro".to_string()]);
        assert!(fetched.id > 0);
    }

    #[tokio::test]
    async fn test_versioned_update_lifecycle() {
        let storage = in_memory_storage();
        let ctx = Ctx::background();
        let author = user(&storage, "alice").await;

        let p1 = storage
            .posts
            .create(
                &ctx,
                NewPost::new(author.id, "Hello", "World").with_tags(["intro"]),
            )
            .await
            .unwrap();
        assert_eq!(p1.version, 1);

        let mut edit = p1.clone();
        edit.content = "World!".to_string();
        let updated = storage.posts.update(&ctx, edit).await.unwrap();
        assert_eq!(updated.version, 2);
        assert_eq!(updated.content, "World!");

        let mut stale = p1.clone();
        stale.content = "lost update".to_string();
        let err = storage.posts.update(&ctx, stale).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound));

        let stored = storage.posts.get_by_id(&ctx, p1.id).await.unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.content, "World!");

        storage.posts.delete(&ctx, p1.id).await.unwrap();
        let err = storage.posts.get_by_id(&ctx, p1.id).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound));
        let err = storage.posts.delete(&ctx, p1.id).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound));
    }

    #[tokio::test]
    async fn test_concurrent_updates_with_same_version_apply_once() {
        let storage = in_memory_storage();
        let ctx = Ctx::background();
        let author = user(&storage, "alice").await;
        let post = storage
            .posts
            .create(&ctx, NewPost::new(author.id, "Hello", "World"))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let posts = storage.posts.clone();
            let mut edit = post.clone();
            edit.content = format!("edit {i}");
            handles.push(tokio::spawn(async move {
                posts.update(&Ctx::background(), edit).await
            }));
        }

        let mut applied = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(updated) => {
                    applied += 1;
                    assert_eq!(updated.version, 2);
                }
                Err(err) => assert!(matches!(err, RepoError::NotFound)),
            }
        }

        assert_eq!(applied, 1);
        let stored = storage.posts.get_by_id(&ctx, post.id).await.unwrap();
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn test_feed_counts_comments_of_followed_authors() {
        let storage = in_memory_storage();
        let ctx = Ctx::background();
        let u1 = user(&storage, "alice").await;
        let u2 = user(&storage, "bob").await;

        storage.followers.follow(&ctx, u1.id, u2.id).await.unwrap();
        let p2 = storage
            .posts
            .create(&ctx, NewPost::new(u2.id, "Hi", "from bob"))
            .await
            .unwrap();

        let feed = storage.posts.get_user_feed(&ctx, u1.id).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].post.id, p2.id);
        assert_eq!(feed[0].comment_count, 0);
        assert_eq!(feed[0].author_username(), Some("bob"));

        storage
            .comments
            .create(&ctx, NewComment::new(p2.id, u1.id, "welcome"))
            .await
            .unwrap();

        let feed = storage.posts.get_user_feed(&ctx, u1.id).await.unwrap();
        assert_eq!(feed[0].comment_count, 1);
    }

    #[tokio::test]
    async fn test_feed_is_scoped_and_newest_first() {
        let storage = in_memory_storage();
        let ctx = Ctx::background();
        let me = user(&storage, "alice").await;
        let friend = user(&storage, "bob").await;
        let stranger = user(&storage, "carol").await;
        storage.followers.follow(&ctx, me.id, friend.id).await.unwrap();

        let mut expected = Vec::new();
        for (author, title) in [(me.id, "mine"), (friend.id, "friend"), (stranger.id, "stranger")]
        {
            let post = storage
                .posts
                .create(&ctx, NewPost::new(author, title, "body"))
                .await
                .unwrap();
            if author != stranger.id {
                expected.push(post.id);
            }
        }
        expected.reverse();

        let feed = storage.posts.get_user_feed(&ctx, me.id).await.unwrap();
        let ids: Vec<i64> = feed.iter().map(|entry| entry.post.id).collect();
        assert_eq!(ids, expected);
        assert!(
            feed.iter()
                .all(|entry| entry.post.user_id == me.id || entry.post.user_id == friend.id)
        );

        let lonely = user(&storage, "dave").await;
        let feed = storage.posts.get_user_feed(&ctx, lonely.id).await.unwrap();
        assert!(feed.is_empty());
    }

    #[tokio::test]
    async fn test_follow_twice_conflicts_and_unfollow_is_idempotent() {
        let storage = in_memory_storage();
        let ctx = Ctx::background();
        let a = user(&storage, "alice").await;
        let b = user(&storage, "bob").await;
        storage
            .posts
            .create(&ctx, NewPost::new(b.id, "Hi", "there"))
            .await
            .unwrap();

        storage.followers.follow(&ctx, a.id, b.id).await.unwrap();
        let err = storage.followers.follow(&ctx, a.id, b.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));

        storage.followers.unfollow(&ctx, a.id, b.id).await.unwrap();
        storage.followers.unfollow(&ctx, a.id, b.id).await.unwrap();

        let feed = storage.posts.get_user_feed(&ctx, a.id).await.unwrap();
        assert!(feed.is_empty());
    }

    #[tokio::test]
    async fn test_comments_are_newest_first_with_authors() {
        let storage = in_memory_storage();
        let ctx = Ctx::background();
        let author = user(&storage, "alice").await;
        let reader = user(&storage, "bob").await;
        let post = storage
            .posts
            .create(&ctx, NewPost::new(author.id, "Hello", "World"))
            .await
            .unwrap();

        let empty = storage.comments.get_by_post_id(&ctx, post.id).await.unwrap();
        assert!(empty.is_empty());

        let first = storage
            .comments
            .create(&ctx, NewComment::new(post.id, reader.id, "first"))
            .await
            .unwrap();
        let second = storage
            .comments
            .create(&ctx, NewComment::new(post.id, author.id, "second"))
            .await
            .unwrap();

        let comments = storage.comments.get_by_post_id(&ctx, post.id).await.unwrap();
        let ids: Vec<i64> = comments.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(
            comments[1].user.as_ref().map(|u| u.username.as_str()),
            Some("bob")
        );
    }

    #[tokio::test]
    async fn test_foreign_keys_are_enforced() {
        let storage = in_memory_storage();
        let ctx = Ctx::background();
        let author = user(&storage, "alice").await;

        let err = storage
            .comments
            .create(&ctx, NewComment::new(404, author.id, "orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));

        let err = storage
            .posts
            .create(&ctx, NewPost::new(404, "Hello", "World"))
            .await
            .unwrap_err();
        assert!(err.is_generic());
    }

    #[tokio::test]
    async fn test_deleting_post_drops_its_comments() {
        let storage = in_memory_storage();
        let ctx = Ctx::background();
        let author = user(&storage, "alice").await;
        let post = storage
            .posts
            .create(&ctx, NewPost::new(author.id, "Hello", "World"))
            .await
            .unwrap();
        storage
            .comments
            .create(&ctx, NewComment::new(post.id, author.id, "self reply"))
            .await
            .unwrap();

        storage.posts.delete(&ctx, post.id).await.unwrap();
        let comments = storage.comments.get_by_post_id(&ctx, post.id).await.unwrap();
        assert!(comments.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let storage = in_memory_storage();
        user(&storage, "alice").await;

        let err = storage
            .users
            .create(
                &Ctx::background(),
                NewUser::new("alice", "other@example.com"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));

        let err = storage
            .users
            .get_by_id(&Ctx::background(), 99)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound));
    }

    #[tokio::test]
    async fn test_cancelled_context_is_reported() {
        let storage = in_memory_storage();
        let ctx = Ctx::background();
        ctx.cancel();

        let err = storage.posts.list(&ctx).await.unwrap_err();
        assert!(matches!(err, RepoError::Cancelled));
    }
}
