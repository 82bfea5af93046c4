//! PostgreSQL store implementations.

use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbBackend, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, Statement,
};

use social_core::domain::{
    Comment, NewComment, NewPost, NewUser, Post, PostWithMetadata, User, UserSummary,
};
use social_core::ports::{CommentRepository, FollowerRepository, PostRepository, UserRepository};
use social_core::{Ctx, RepoError};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::follower::{self, Entity as FollowerEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};
use crate::bounded::bounded;

/// PostgreSQL post store.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL user store.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL comment store.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL follower store.
pub type PostgresFollowerRepository = PostgresBaseRepository<FollowerEntity>;

/// Own posts plus posts by followed users, with comment counts and author names.
pub(crate) const FEED_QUERY: &str = r#"
SELECT p.id, p.user_id, p.title, p.content, p.tags, p.version, p.created_at, p.updated_at,
       u.username, COUNT(c.id) AS comment_count
FROM posts p
LEFT JOIN comments c ON c.post_id = p.id
LEFT JOIN users u ON u.id = p.user_id
WHERE p.user_id = $1
   OR p.user_id IN (SELECT f.user_id FROM followers f WHERE f.follower_id = $1)
GROUP BY p.id, u.username
ORDER BY p.created_at DESC, p.id DESC
"#;

#[derive(Debug, FromQueryResult)]
struct FeedRow {
    id: i64,
    user_id: i64,
    title: String,
    content: String,
    tags: Vec<String>,
    version: i32,
    created_at: DateTimeWithTimeZone,
    updated_at: DateTimeWithTimeZone,
    username: Option<String>,
    comment_count: i64,
}

impl From<FeedRow> for PostWithMetadata {
    fn from(row: FeedRow) -> Self {
        let user = row.username.map(|username| UserSummary {
            id: row.user_id,
            username,
        });

        Self {
            post: Post {
                id: row.id,
                user_id: row.user_id,
                title: row.title,
                content: row.content,
                tags: row.tags,
                version: row.version,
                created_at: row.created_at.into(),
                updated_at: row.updated_at.into(),
                comments: Vec::new(),
                user,
            },
            comment_count: row.comment_count,
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, ctx: &Ctx, new_post: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel {
            user_id: Set(new_post.user_id),
            title: Set(new_post.title),
            content: Set(new_post.content),
            tags: Set(new_post.tags),
            ..Default::default()
        };

        bounded(ctx, async {
            let inserted = model.insert(self.db.as_ref()).await.map_err(map_db_err)?;
            Ok(inserted.into())
        })
        .await
    }

    async fn get_by_id(&self, ctx: &Ctx, id: i64) -> Result<Post, RepoError> {
        self.fetch_by_id(ctx, id).await.map(Into::into)
    }

    async fn list(&self, ctx: &Ctx) -> Result<Vec<Post>, RepoError> {
        bounded(ctx, async {
            let models = PostEntity::find()
                .all(self.db.as_ref())
                .await
                .map_err(map_db_err)?;

            Ok(models.into_iter().map(Into::into).collect())
        })
        .await
    }

    async fn update(&self, ctx: &Ctx, edited: Post) -> Result<Post, RepoError> {
        // Compare-and-swap on (id, version); the backend does the check.
        bounded(ctx, async {
            let mut rows = PostEntity::update_many()
                .col_expr(post::Column::Title, Expr::value(edited.title))
                .col_expr(post::Column::Content, Expr::value(edited.content))
                .col_expr(
                    post::Column::Version,
                    Expr::col(post::Column::Version).add(1),
                )
                .col_expr(post::Column::UpdatedAt, Expr::cust("CURRENT_TIMESTAMP"))
                .filter(post::Column::Id.eq(edited.id))
                .filter(post::Column::Version.eq(edited.version))
                .exec_with_returning(self.db.as_ref())
                .await
                .map_err(map_db_err)?;

            rows.pop().map(Into::into).ok_or(RepoError::NotFound)
        })
        .await
    }

    async fn delete(&self, ctx: &Ctx, id: i64) -> Result<(), RepoError> {
        self.remove_by_id(ctx, id).await
    }

    async fn get_user_feed(
        &self,
        ctx: &Ctx,
        user_id: i64,
    ) -> Result<Vec<PostWithMetadata>, RepoError> {
        let statement =
            Statement::from_sql_and_values(DbBackend::Postgres, FEED_QUERY, [user_id.into()]);

        bounded(ctx, async {
            let rows = FeedRow::find_by_statement(statement)
                .all(self.db.as_ref())
                .await
                .map_err(map_db_err)?;

            Ok(rows.into_iter().map(Into::into).collect())
        })
        .await
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, ctx: &Ctx, new_user: NewUser) -> Result<User, RepoError> {
        let model = user::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            ..Default::default()
        };

        bounded(ctx, async {
            let inserted = model.insert(self.db.as_ref()).await.map_err(map_db_err)?;
            Ok(inserted.into())
        })
        .await
    }

    async fn get_by_id(&self, ctx: &Ctx, id: i64) -> Result<User, RepoError> {
        self.fetch_by_id(ctx, id).await.map(Into::into)
    }
}

#[derive(Debug, FromQueryResult)]
struct CommentRow {
    id: i64,
    post_id: i64,
    user_id: i64,
    content: String,
    created_at: DateTimeWithTimeZone,
    username: String,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            post_id: row.post_id,
            user_id: row.user_id,
            user: Some(UserSummary {
                id: row.user_id,
                username: row.username,
            }),
            content: row.content,
            created_at: row.created_at.into(),
        }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(&self, ctx: &Ctx, new_comment: NewComment) -> Result<Comment, RepoError> {
        let model = comment::ActiveModel {
            post_id: Set(new_comment.post_id),
            user_id: Set(new_comment.user_id),
            content: Set(new_comment.content),
            ..Default::default()
        };

        bounded(ctx, async {
            let inserted = model.insert(self.db.as_ref()).await.map_err(map_db_err)?;
            Ok(inserted.into())
        })
        .await
    }

    async fn get_by_post_id(&self, ctx: &Ctx, post_id: i64) -> Result<Vec<Comment>, RepoError> {
        bounded(ctx, async {
            let rows = CommentEntity::find()
                .select_only()
                .columns([
                    comment::Column::Id,
                    comment::Column::PostId,
                    comment::Column::UserId,
                    comment::Column::Content,
                    comment::Column::CreatedAt,
                ])
                .column_as(user::Column::Username, "username")
                .join(JoinType::InnerJoin, comment::Relation::User.def())
                .filter(comment::Column::PostId.eq(post_id))
                .order_by_desc(comment::Column::CreatedAt)
                .order_by_desc(comment::Column::Id)
                .into_model::<CommentRow>()
                .all(self.db.as_ref())
                .await
                .map_err(map_db_err)?;

            Ok(rows.into_iter().map(Into::into).collect())
        })
        .await
    }
}

#[async_trait]
impl FollowerRepository for PostgresFollowerRepository {
    async fn follow(&self, ctx: &Ctx, follower_id: i64, user_id: i64) -> Result<(), RepoError> {
        let edge = follower::ActiveModel {
            follower_id: Set(follower_id),
            user_id: Set(user_id),
            ..Default::default()
        };

        bounded(ctx, async {
            FollowerEntity::insert(edge)
                .exec_without_returning(self.db.as_ref())
                .await
                .map_err(map_db_err)?;
            Ok(())
        })
        .await
    }

    async fn unfollow(&self, ctx: &Ctx, follower_id: i64, user_id: i64) -> Result<(), RepoError> {
        bounded(ctx, async {
            FollowerEntity::delete_many()
                .filter(follower::Column::FollowerId.eq(follower_id))
                .filter(follower::Column::UserId.eq(user_id))
                .exec(self.db.as_ref())
                .await
                .map_err(map_db_err)?;
            Ok(())
        })
        .await
    }
}
