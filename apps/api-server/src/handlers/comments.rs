//! Comment handlers.

use actix_web::{HttpResponse, web};

use social_core::domain::NewComment;
use social_shared::ApiResponse;
use social_shared::dto::CreateCommentRequest;

use crate::middleware::context::RequestCtx;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /v1/posts/{id}/comments
pub async fn create_comment(
    state: web::Data<AppState>,
    ctx: RequestCtx,
    path: web::Path<i64>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    // 404 for a missing post instead of a foreign key failure.
    state.storage.posts.get_by_id(&ctx, post_id).await?;

    let comment = state
        .storage
        .comments
        .create(
            &ctx,
            NewComment::new(post_id, state.stub_user_id, body.into_inner().content),
        )
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(comment)))
}
