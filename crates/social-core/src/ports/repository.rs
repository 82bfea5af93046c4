use async_trait::async_trait;

use crate::context::Ctx;
use crate::domain::{Comment, NewComment, NewPost, NewUser, Post, PostWithMetadata, User};
use crate::error::RepoError;

/// Post store, including the follower feed.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a post and return it with its generated id, timestamps and version.
    async fn create(&self, ctx: &Ctx, post: NewPost) -> Result<Post, RepoError>;

    /// Fetch a post by id. Missing rows yield `RepoError::NotFound`.
    async fn get_by_id(&self, ctx: &Ctx, id: i64) -> Result<Post, RepoError>;

    /// Every post, in backend order.
    async fn list(&self, ctx: &Ctx) -> Result<Vec<Post>, RepoError>;

    /// Write `title` and `content` if `post.version` still matches the stored
    /// version. Returns the refreshed post carrying the bumped version.
    ///
    /// A stale version and a missing row both yield `RepoError::NotFound`.
    async fn update(&self, ctx: &Ctx, post: Post) -> Result<Post, RepoError>;

    /// Remove a post. Missing rows yield `RepoError::NotFound`.
    async fn delete(&self, ctx: &Ctx, id: i64) -> Result<(), RepoError>;

    /// Posts written by `user_id` or by anyone `user_id` follows, newest first,
    /// each with its comment count and author.
    async fn get_user_feed(
        &self,
        ctx: &Ctx,
        user_id: i64,
    ) -> Result<Vec<PostWithMetadata>, RepoError>;
}

/// User store.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, ctx: &Ctx, user: NewUser) -> Result<User, RepoError>;

    async fn get_by_id(&self, ctx: &Ctx, id: i64) -> Result<User, RepoError>;
}

/// Comment store.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, ctx: &Ctx, comment: NewComment) -> Result<Comment, RepoError>;

    /// Comments on a post with their authors, newest first.
    async fn get_by_post_id(&self, ctx: &Ctx, post_id: i64) -> Result<Vec<Comment>, RepoError>;
}

/// Follower edges. `follower_id` follows `user_id`.
#[async_trait]
pub trait FollowerRepository: Send + Sync {
    /// Add the edge. An existing edge yields `RepoError::Conflict`.
    async fn follow(&self, ctx: &Ctx, follower_id: i64, user_id: i64) -> Result<(), RepoError>;

    /// Remove the edge. Removing a missing edge succeeds.
    async fn unfollow(&self, ctx: &Ctx, follower_id: i64, user_id: i64) -> Result<(), RepoError>;
}
