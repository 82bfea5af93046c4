//! Storage facade - the four stores behind their capability traits.

use std::sync::Arc;

use crate::ports::{CommentRepository, FollowerRepository, PostRepository, UserRepository};

/// Every store the request layer talks to.
///
/// Callers depend on the traits only; which backend sits behind them is
/// decided once, when the facade is built.
#[derive(Clone)]
pub struct Storage {
    pub posts: Arc<dyn PostRepository>,
    pub users: Arc<dyn UserRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub followers: Arc<dyn FollowerRepository>,
}

impl Storage {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        comments: Arc<dyn CommentRepository>,
        followers: Arc<dyn FollowerRepository>,
    ) -> Self {
        Self {
            posts,
            users,
            comments,
            followers,
        }
    }
}
