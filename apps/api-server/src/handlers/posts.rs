//! Post handlers.

use actix_web::{HttpResponse, web};

use social_core::domain::NewPost;
use social_shared::ApiResponse;
use social_shared::dto::{CreatePostRequest, UpdatePostRequest};

use crate::middleware::context::RequestCtx;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /v1/posts
pub async fn create_post(
    state: web::Data<AppState>,
    ctx: RequestCtx,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // TODO: take the author from the authenticated identity once auth lands.
    let new_post = NewPost {
        user_id: state.stub_user_id,
        title: req.title,
        content: req.content,
        tags: req.tags,
    };

    let post = state.storage.posts.create(&ctx, new_post).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(post)))
}

/// GET /v1/posts
pub async fn list_posts(state: web::Data<AppState>, ctx: RequestCtx) -> AppResult<HttpResponse> {
    let posts = state.storage.posts.list(&ctx).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// GET /v1/posts/{id} - the post with its comments.
pub async fn get_post(
    state: web::Data<AppState>,
    ctx: RequestCtx,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let mut post = state.storage.posts.get_by_id(&ctx, id).await?;
    post.comments = state.storage.comments.get_by_post_id(&ctx, id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// PATCH /v1/posts/{id}
///
/// The body carries the version the client last saw; a stale version is
/// answered with 404 like a missing post.
pub async fn update_post(
    state: web::Data<AppState>,
    ctx: RequestCtx,
    path: web::Path<i64>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let req = body.into_inner();

    let mut post = state.storage.posts.get_by_id(&ctx, id).await?;
    if let Some(title) = req.title {
        post.title = title;
    }
    if let Some(content) = req.content {
        post.content = content;
    }
    post.version = req.version;

    let updated = state.storage.posts.update(&ctx, post).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(updated)))
}

/// DELETE /v1/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    ctx: RequestCtx,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.storage.posts.delete(&ctx, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
