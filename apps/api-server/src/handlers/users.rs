//! User and follower handlers.

use actix_web::{HttpResponse, web};

use social_core::domain::NewUser;
use social_shared::ApiResponse;
use social_shared::dto::CreateUserRequest;

use crate::middleware::context::RequestCtx;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /v1/users
pub async fn create_user(
    state: web::Data<AppState>,
    ctx: RequestCtx,
    body: web::Json<CreateUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let user = state
        .storage
        .users
        .create(&ctx, NewUser::new(req.username, req.email))
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(user)))
}

/// GET /v1/users/{id}
pub async fn get_user(
    state: web::Data<AppState>,
    ctx: RequestCtx,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let user = state.storage.users.get_by_id(&ctx, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(user)))
}

/// PUT /v1/users/{id}/follow - the current identity follows `id`.
///
/// Following twice answers 409.
pub async fn follow_user(
    state: web::Data<AppState>,
    ctx: RequestCtx,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state
        .storage
        .followers
        .follow(&ctx, state.stub_user_id, path.into_inner())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// PUT /v1/users/{id}/unfollow
pub async fn unfollow_user(
    state: web::Data<AppState>,
    ctx: RequestCtx,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state
        .storage
        .followers
        .unfollow(&ctx, state.stub_user_id, path.into_inner())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
