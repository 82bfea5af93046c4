use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserSummary;

/// Comment entity. Comments are never edited once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    /// Author summary, filled when comments are read back for a post.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when commenting on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub post_id: i64,
    pub user_id: i64,
    pub content: String,
}

impl NewComment {
    pub fn new(post_id: i64, user_id: i64, content: impl Into<String>) -> Self {
        Self {
            post_id,
            user_id,
            content: content.into(),
        }
    }
}
