use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Comment, UserSummary};

/// Post entity.
///
/// `version` is the optimistic concurrency token: it starts at 1 and the
/// store bumps it by exactly one on every successful update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Loaded on demand; never written with the post row.
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Author summary, only populated by feed queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

/// Fields supplied when publishing a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

impl NewPost {
    pub fn new(user_id: i64, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            user_id,
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Feed projection: a post, its author and how many comments it has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostWithMetadata {
    #[serde(flatten)]
    pub post: Post,
    pub comment_count: i64,
}

impl PostWithMetadata {
    pub fn author_username(&self) -> Option<&str> {
        self.post.user.as_ref().map(|user| user.username.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post() -> Post {
        let now = Utc::now();
        Post {
            id: 7,
            user_id: 2,
            title: "Hello".to_string(),
            content: "World".to_string(),
            tags: vec!["intro".to_string()],
            version: 1,
            created_at: now,
            updated_at: now,
            comments: Vec::new(),
            user: None,
        }
    }

    #[test]
    fn new_post_collects_tags() {
        let post = NewPost::new(1, "Hello", "World").with_tags(["intro", "rust"]);
        assert_eq!(post.tags, vec!["intro".to_string(), "rust".to_string()]);
    }

    #[test]
    fn feed_entry_serializes_flat() {
        let mut post = sample_post();
        post.user = Some(UserSummary {
            id: 2,
            username: "bob".to_string(),
        });
        let entry = PostWithMetadata {
            post,
            comment_count: 3,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["comment_count"], 3);
        assert_eq!(json["user"]["username"], "bob");
        assert_eq!(entry.author_username(), Some("bob"));
    }

    #[test]
    fn author_is_omitted_outside_feed() {
        let json = serde_json::to_value(sample_post()).unwrap();
        assert!(json.get("user").is_none());
        assert_eq!(json["version"], 1);
    }
}
